use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

use crate::imaging::domain::image_encoder::{EncodeError, ImageEncoder};
use crate::shared::constants::DEFAULT_JPEG_QUALITY;
use crate::shared::frame::Frame;

/// JPEG encoder backed by the `image` crate.
pub struct JpegImageEncoder {
    quality: u8,
}

impl JpegImageEncoder {
    /// `quality` is clamped to 1..=100.
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegImageEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl ImageEncoder for JpegImageEncoder {
    fn encode(&self, frame: &Frame) -> Result<Vec<u8>, EncodeError> {
        let color = match frame.channels() {
            1 => ExtendedColorType::L8,
            3 => ExtendedColorType::Rgb8,
            channels => return Err(EncodeError::UnsupportedChannels { channels }),
        };

        let mut bytes = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, self.quality);
        encoder.encode(frame.data(), frame.width(), frame.height(), color)?;
        log::debug!(
            "Encoded {}x{} JPEG at quality {} ({} bytes)",
            frame.width(),
            frame.height(),
            self.quality,
            bytes.len()
        );
        Ok(bytes)
    }
}
