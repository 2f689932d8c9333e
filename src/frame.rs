use std::{fs, path::Path};

use zune_jpeg::JpegDecoder;

use crate::{errors::Error, Result};

/// Pixel layout of incoming image buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ImageEncoding {
    /// Raw 8-bit BGR, as written by OpenCV-based capture nodes.
    #[default]
    Bgr8,
    Rgb8,
    /// Compressed JPEG, e.g. from `zenoh-camera`.
    Jpeg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFormat {
    pub width: u32,
    pub height: u32,
    pub encoding: ImageEncoding,
}

impl FrameFormat {
    /// Byte length of one decoded width x height x 3 frame.
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    /// Decodes an input buffer into tightly packed RGB.
    pub fn to_rgb(&self, data: &[u8]) -> Result<Vec<u8>> {
        let rgb = match self.encoding {
            ImageEncoding::Rgb8 => {
                self.check_len(data.len())?;
                data.to_vec()
            }
            ImageEncoding::Bgr8 => {
                self.check_len(data.len())?;
                let mut rgb = data.to_vec();
                for px in rgb.chunks_exact_mut(3) {
                    px.swap(0, 2);
                }
                rgb
            }
            ImageEncoding::Jpeg => {
                let mut decoder = JpegDecoder::new(data);
                let rgb = decoder.decode()?;
                let expected = (self.width as usize, self.height as usize);
                match decoder.dimensions() {
                    Some(actual) if actual == expected => {}
                    actual => {
                        return Err(Error::FrameDimensions {
                            expected,
                            actual: actual.unwrap_or_default(),
                        });
                    }
                }
                self.check_len(rgb.len())?;
                rgb
            }
        };
        Ok(rgb)
    }

    fn check_len(&self, actual: usize) -> Result<()> {
        let expected = self.frame_len();
        if actual != expected {
            return Err(Error::FrameSize { expected, actual });
        }
        Ok(())
    }
}

/// Encodes in memory first, so a failed write surfaces here instead of in a
/// drop.
pub fn write_png(path: &Path, rgb: &[u8], width: u32, height: u32) -> Result<()> {
    let mut png_bytes = Vec::new();
    let mut encoder = png::Encoder::new(&mut png_bytes, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgb)?;
    writer.finish()?;
    fs::write(path, png_bytes)?;
    Ok(())
}
