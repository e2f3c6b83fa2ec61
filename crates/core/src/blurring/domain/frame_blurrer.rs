use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Domain interface for blurring rectangular regions of a frame.
///
/// Implementations modify the frame in-place (`&mut Frame`). Regions are
/// expected to be already clamped to the frame.
pub trait FrameBlurrer: Send + Sync {
    fn blur(&self, frame: &mut Frame, regions: &[BoundingBox])
        -> Result<(), Box<dyn std::error::Error>>;
}
