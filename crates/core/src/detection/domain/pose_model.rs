use thiserror::Error;

use crate::shared::frame::Frame;

use super::head_landmarks::LandmarkSet;

#[derive(Error, Debug)]
pub enum PoseError {
    #[error("pose inference failed: {0}")]
    Inference(String),
    #[error("malformed pose output: {0}")]
    MalformedOutput(String),
    #[error("pose model lock was poisoned")]
    Poisoned,
}

/// Domain interface for an external pose-estimation model.
///
/// `Ok(None)` means the model ran and found no pose. Landmarks are in
/// pixel coordinates of `sub_image`. One instance is shared across
/// pipeline runs, so implementations must tolerate concurrent calls,
/// serialising internally if the backend keeps mutable scratch state.
pub trait PoseModel: Send + Sync {
    fn estimate(&self, sub_image: &Frame) -> Result<Option<LandmarkSet>, PoseError>;
}
