use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

use super::frame_blurrer::FrameBlurrer;

/// Result of blurring one region.
#[derive(Clone, Debug, PartialEq)]
pub enum BlurOutcome {
    /// The in-bounds part of the request was blurred.
    Applied(BoundingBox),
    /// Degenerate request, or nothing of it inside the image.
    Empty,
    /// The blurrer failed; the image is left as it was for this region.
    Failed(String),
}

impl BlurOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, BlurOutcome::Applied(_))
    }
}

/// Blurs a single image-absolute region, whatever produced it.
///
/// Validates and clamps the region, then delegates to a [`FrameBlurrer`].
/// Never panics or propagates errors: one bad region must not abort the
/// whole image.
pub struct RegionBlurApplicator {
    blurrer: Box<dyn FrameBlurrer>,
}

impl RegionBlurApplicator {
    pub fn new(blurrer: Box<dyn FrameBlurrer>) -> Self {
        Self { blurrer }
    }

    pub fn apply(&self, frame: &mut Frame, region: &BoundingBox) -> BlurOutcome {
        if region.is_degenerate() {
            return BlurOutcome::Empty;
        }
        let Some(clamped) = region.clamp_to(frame.width(), frame.height()) else {
            return BlurOutcome::Empty;
        };
        if !frame.is_consistent() {
            return BlurOutcome::Failed("frame buffer does not match its dimensions".into());
        }

        match self.blurrer.blur(frame, &[clamped]) {
            Ok(()) => BlurOutcome::Applied(clamped),
            Err(e) => {
                log::warn!("Blur failed for region ({clamped}): {e}");
                BlurOutcome::Failed(e.to_string())
            }
        }
    }
}
