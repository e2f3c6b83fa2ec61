use crate::detection::domain::fallback_region::FallbackDecline;
use crate::detection::domain::head_pose_detector::DegradedReason;
use crate::shared::bounding_box::BoundingBox;

use super::skip_policy::SkipReason;

/// How the blurred head region was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeadSource {
    Pose,
    Fallback,
}

/// What happened to one person box.
#[derive(Clone, Debug, PartialEq)]
pub enum PersonOutcome {
    Skipped(SkipReason),
    /// `region` is image-absolute and already clamped.
    Blurred {
        region: BoundingBox,
        source: HeadSource,
        confidence: f64,
    },
    /// A head region was chosen but could not be blurred.
    BlurFailed {
        region: BoundingBox,
        source: HeadSource,
        message: String,
    },
    /// Pose detection was not usable and the box did not qualify for the fallback.
    FallbackDeclined {
        detection: DegradedReason,
        decline: FallbackDecline,
    },
}

impl PersonOutcome {
    pub fn is_blurred(&self) -> bool {
        matches!(self, PersonOutcome::Blurred { .. })
    }
}

/// Per-run record of what was altered, one entry per input box in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlurReport {
    pub outcomes: Vec<PersonOutcome>,
}

impl BlurReport {
    pub fn blur_applied(&self) -> bool {
        self.outcomes.iter().any(PersonOutcome::is_blurred)
    }

    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_blurred()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, PersonOutcome::Skipped(_)))
            .count()
    }

    /// Boxes that passed the skip rules, whatever their result.
    pub fn processed_count(&self) -> usize {
        self.outcomes.len() - self.skipped_count()
    }

    pub fn blurred_regions(&self) -> impl Iterator<Item = (&BoundingBox, HeadSource)> {
        self.outcomes.iter().filter_map(|o| match o {
            PersonOutcome::Blurred { region, source, .. } => Some((region, *source)),
            _ => None,
        })
    }
}

/// Result of one blur run: the encoded image, present only when something
/// was blurred, plus the report.
#[derive(Clone, Debug, PartialEq)]
pub struct BlurOutput {
    pub image: Option<Vec<u8>>,
    pub report: BlurReport,
}

impl BlurOutput {
    pub fn blur_applied(&self) -> bool {
        self.report.blur_applied()
    }
}
