use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::frame::{Frame, FrameError};

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unreadable image data: {0}")]
    Codec(#[from] image::ImageError),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Decodes any format the `image` crate recognises into an RGB frame.
pub fn decode_image(bytes: &[u8]) -> Result<Frame, DecodeError> {
    let rgb = image::load_from_memory(bytes)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Frame::try_new(rgb.into_raw(), width, height, 3)?)
}

pub fn read_image(path: &Path) -> Result<Frame, DecodeError> {
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let frame = decode_image(&bytes)?;
    log::debug!(
        "Decoded {} ({}x{})",
        path.display(),
        frame.width(),
        frame.height()
    );
    Ok(frame)
}
