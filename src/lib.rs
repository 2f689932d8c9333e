mod errors;
pub use errors::{Error, Result};

pub mod message;
pub mod node;

pub mod encoder;
pub mod episode;
pub mod frame;
pub mod webcam_saver;

pub mod reachy;
pub mod simulated_reachy;
