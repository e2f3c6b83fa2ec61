use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("cannot encode {channels}-channel image")]
    UnsupportedChannels { channels: u8 },
    #[error("image encoding failed: {0}")]
    Codec(#[from] image::ImageError),
}

/// Compresses a frame into a single still-image payload.
pub trait ImageEncoder: Send + Sync {
    fn encode(&self, frame: &Frame) -> Result<Vec<u8>, EncodeError>;
}
