use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("png encoder: {0}")]
    Png(#[from] png::EncodingError),
    #[error("jpeg decoder: {0:?}")]
    JPEGDecoder(zune_jpeg::errors::DecodeErrors),
    #[error("zenoh: {0}")]
    Zenoh(#[from] Box<dyn std::error::Error + Send + Sync>),
    #[error("bad envelope: {0}")]
    Envelope(String),
    #[error("frame size mismatch: expected {expected} bytes, got {actual}")]
    FrameSize { expected: usize, actual: usize },
    #[error("frame dimensions mismatch: expected {expected:?}, got {actual:?}")]
    FrameDimensions {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("no output declared for `{0}`")]
    UnknownOutput(String),
    #[error("empty `{0}` input")]
    EmptyInput(String),
    #[error("sdk: {0}")]
    Sdk(String),
}

impl From<zune_jpeg::errors::DecodeErrors> for Error {
    fn from(value: zune_jpeg::errors::DecodeErrors) -> Self {
        Error::JPEGDecoder(value)
    }
}
