use crate::detection::domain::head_landmarks::LandmarkSet;
use crate::detection::domain::pose_model::{PoseError, PoseModel};
use crate::shared::frame::Frame;

/// Pose model that never finds a pose.
///
/// Lets the pipeline run without a landmark model: every eligible person
/// goes straight to the top-of-box fallback.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPoseModel;

impl PoseModel for NoPoseModel {
    fn estimate(&self, _sub_image: &Frame) -> Result<Option<LandmarkSet>, PoseError> {
        Ok(None)
    }
}
