use std::sync::Arc;

use thiserror::Error;

use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::blurring::domain::region_blur_applicator::{BlurOutcome, RegionBlurApplicator};
use crate::detection::domain::fallback_region::fallback_head_region;
use crate::detection::domain::head_geometry::HeadBoxEstimator;
use crate::detection::domain::head_pose_detector::{DegradedReason, DetectionResult, HeadPoseDetector};
use crate::detection::domain::pose_model::PoseModel;
use crate::imaging::domain::image_encoder::{EncodeError, ImageEncoder};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::{Frame, FrameError};

use super::blur_report::{BlurOutput, BlurReport, HeadSource, PersonOutcome};
use super::processing_config::{ConfigError, ProcessingConfig};
use super::skip_policy::skip_reason;

/// Faults that abort a run. Everything else is reported per person.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid image: {0}")]
    InvalidFrame(#[from] FrameError),
    #[error("original image height is zero")]
    ZeroOriginalHeight,
    #[error("person box {index} has negative size ({bbox})")]
    MalformedBox { index: usize, bbox: BoundingBox },
    #[error("invalid processing config: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Blurs the heads of detected people in one still image.
///
/// Per person box: apply the skip rules, try pose-based head localisation
/// on the cropped sub-image, fall back to the top of an upright box, and
/// blur whatever region was found. Boxes are handled in input order and
/// later blurs may overlap earlier ones.
///
/// The pose model is shared; one use case can serve concurrent runs, each
/// with its own frame.
pub struct BlurHeadsUseCase {
    detector: HeadPoseDetector,
    applicator: RegionBlurApplicator,
    encoder: Box<dyn ImageEncoder>,
}

impl BlurHeadsUseCase {
    pub fn new(
        pose_model: Arc<dyn PoseModel>,
        blurrer: Box<dyn FrameBlurrer>,
        encoder: Box<dyn ImageEncoder>,
    ) -> Self {
        Self::with_detector(HeadPoseDetector::new(pose_model), blurrer, encoder)
    }

    pub fn with_detector(
        detector: HeadPoseDetector,
        blurrer: Box<dyn FrameBlurrer>,
        encoder: Box<dyn ImageEncoder>,
    ) -> Self {
        Self {
            detector,
            applicator: RegionBlurApplicator::new(blurrer),
            encoder,
        }
    }

    /// Runs the pipeline over `persons` and encodes the result.
    ///
    /// `original_size` is the `(width, height)` the detector saw; only its
    /// height is used, for the fast-mode rule. The returned image is `None`
    /// when no box was blurred.
    pub fn execute(
        &self,
        mut frame: Frame,
        persons: &[BoundingBox],
        original_size: (u32, u32),
        config: &ProcessingConfig,
    ) -> Result<BlurOutput, PipelineError> {
        frame.validate()?;
        config.validate()?;
        let (_, original_height) = original_size;
        if original_height == 0 {
            return Err(PipelineError::ZeroOriginalHeight);
        }
        if let Some((index, bbox)) = persons
            .iter()
            .enumerate()
            .find(|(_, b)| b.width < 0 || b.height < 0)
        {
            return Err(PipelineError::MalformedBox { index, bbox: *bbox });
        }

        let estimator = HeadBoxEstimator::new(config.head_geometry.clone());
        let mut report = BlurReport::default();
        for (index, person) in persons.iter().enumerate() {
            let outcome =
                self.process_person(&mut frame, person, original_height, &estimator, config);
            log::debug!("Person {index} ({person}): {outcome:?}");
            report.outcomes.push(outcome);
        }

        log::info!(
            "Blurred {} of {} people ({} skipped, mode {})",
            report.applied_count(),
            persons.len(),
            report.skipped_count(),
            config.mode
        );

        let image = if report.blur_applied() {
            Some(self.encoder.encode(&frame)?)
        } else {
            None
        };
        Ok(BlurOutput { image, report })
    }

    fn process_person(
        &self,
        frame: &mut Frame,
        person: &BoundingBox,
        original_height: u32,
        estimator: &HeadBoxEstimator,
        config: &ProcessingConfig,
    ) -> PersonOutcome {
        if let Some(reason) = skip_reason(person, original_height, config) {
            return PersonOutcome::Skipped(reason);
        }

        let (result, origin) = match frame.crop(person) {
            Some((sub_image, origin)) => (
                self.detector
                    .detect(&sub_image, estimator, config.confidence_threshold),
                origin,
            ),
            None => (
                DetectionResult::degraded(DegradedReason::SubImageTooSmall {
                    width: 0,
                    height: 0,
                }),
                *person,
            ),
        };

        if let Some(head) = result.valid_head_box() {
            let region = head.offset_by(&origin);
            return self.blur(frame, region, HeadSource::Pose, result.confidence);
        }

        let degraded = result
            .degraded
            .unwrap_or(DegradedReason::InsufficientLandmarks);
        log::debug!(
            "Pose unusable for {person} ({degraded}, confidence {:.2}); trying fallback",
            result.confidence
        );
        match fallback_head_region(person, &config.fallback) {
            Ok(region) => self.blur(frame, region, HeadSource::Fallback, result.confidence),
            Err(decline) => PersonOutcome::FallbackDeclined {
                detection: degraded,
                decline,
            },
        }
    }

    fn blur(
        &self,
        frame: &mut Frame,
        region: BoundingBox,
        source: HeadSource,
        confidence: f64,
    ) -> PersonOutcome {
        match self.applicator.apply(frame, &region) {
            BlurOutcome::Applied(applied) => PersonOutcome::Blurred {
                region: applied,
                source,
                confidence,
            },
            BlurOutcome::Empty => PersonOutcome::BlurFailed {
                region,
                source,
                message: "region empty after clamping".into(),
            },
            BlurOutcome::Failed(message) => PersonOutcome::BlurFailed {
                region,
                source,
                message,
            },
        }
    }
}
