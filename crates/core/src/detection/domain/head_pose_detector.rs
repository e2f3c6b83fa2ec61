use std::sync::Arc;

use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::MIN_POSE_INPUT_SIZE;
use crate::shared::frame::Frame;

use super::head_geometry::HeadBoxEstimator;
use super::head_landmarks::LandmarkSet;
use super::pose_model::PoseModel;

/// Why a detection could not be trusted.
#[derive(Clone, Debug, PartialEq)]
pub enum DegradedReason {
    SubImageTooSmall { width: u32, height: u32 },
    NoPoseFound,
    ModelFault(String),
    MalformedLandmarks,
    InsufficientLandmarks,
    LowConfidence,
}

impl std::fmt::Display for DegradedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegradedReason::SubImageTooSmall { width, height } => {
                write!(f, "sub-image too small ({width}x{height})")
            }
            DegradedReason::NoPoseFound => write!(f, "no pose found"),
            DegradedReason::ModelFault(msg) => write!(f, "pose model fault: {msg}"),
            DegradedReason::MalformedLandmarks => write!(f, "malformed landmarks"),
            DegradedReason::InsufficientLandmarks => write!(f, "insufficient visible landmarks"),
            DegradedReason::LowConfidence => write!(f, "confidence below threshold"),
        }
    }
}

/// Head localisation result for one person sub-image.
///
/// `head_box` is relative to the sub-image. A low-confidence result may
/// still carry a box; only valid results are blurred directly.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionResult {
    pub head_box: Option<BoundingBox>,
    /// Mean visibility of the head landmarks, 0.0 when none were returned.
    pub confidence: f64,
    pub degraded: Option<DegradedReason>,
}

impl DetectionResult {
    pub fn degraded(reason: DegradedReason) -> Self {
        Self {
            head_box: None,
            confidence: 0.0,
            degraded: Some(reason),
        }
    }

    /// Valid iff a box exists and `confidence >= threshold`.
    pub fn evaluate(head_box: Option<BoundingBox>, confidence: f64, threshold: f64) -> Self {
        let degraded = match head_box {
            None => Some(DegradedReason::InsufficientLandmarks),
            Some(_) if confidence < threshold => Some(DegradedReason::LowConfidence),
            Some(_) => None,
        };
        Self {
            head_box,
            confidence,
            degraded,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.degraded.is_none() && self.head_box.is_some()
    }

    /// The head box when the result is valid.
    pub fn valid_head_box(&self) -> Option<BoundingBox> {
        if self.is_valid() {
            self.head_box
        } else {
            None
        }
    }
}

/// Locates the head inside a person crop via an injected pose model.
///
/// Model faults are absorbed here and reported as degraded results; a
/// failed detection is an expected outcome, not an error.
pub struct HeadPoseDetector {
    model: Arc<dyn PoseModel>,
    min_input_size: u32,
}

impl HeadPoseDetector {
    pub fn new(model: Arc<dyn PoseModel>) -> Self {
        Self::with_min_input_size(model, MIN_POSE_INPUT_SIZE)
    }

    pub fn with_min_input_size(model: Arc<dyn PoseModel>, min_input_size: u32) -> Self {
        Self {
            model,
            min_input_size,
        }
    }

    pub fn detect(
        &self,
        sub_image: &Frame,
        estimator: &HeadBoxEstimator,
        confidence_threshold: f64,
    ) -> DetectionResult {
        let (w, h) = (sub_image.width(), sub_image.height());
        if w < self.min_input_size || h < self.min_input_size {
            return DetectionResult::degraded(DegradedReason::SubImageTooSmall {
                width: w,
                height: h,
            });
        }

        let landmarks = match self.model.estimate(sub_image) {
            Ok(Some(landmarks)) => landmarks,
            Ok(None) => return DetectionResult::degraded(DegradedReason::NoPoseFound),
            Err(e) => {
                log::warn!("Pose model failed on {w}x{h} sub-image: {e}");
                return DetectionResult::degraded(DegradedReason::ModelFault(e.to_string()));
            }
        };

        if !is_well_formed(&landmarks) {
            log::warn!("Pose model returned malformed landmarks for {w}x{h} sub-image");
            return DetectionResult::degraded(DegradedReason::MalformedLandmarks);
        }

        let confidence = landmarks.mean_visibility();
        let head_box = estimator.estimate(&landmarks, w, h);
        DetectionResult::evaluate(head_box, confidence, confidence_threshold)
    }
}

fn is_well_formed(landmarks: &LandmarkSet) -> bool {
    landmarks
        .iter()
        .all(|(_, lm)| lm.visibility.is_finite() && (0.0..=1.0).contains(&lm.visibility))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::head_landmarks::{HeadLandmark, Landmark};
    use crate::detection::domain::pose_model::PoseError;
    use approx::assert_relative_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // --- Stubs ---

    enum Reply {
        Landmarks(LandmarkSet),
        NoPose,
        Fail,
    }

    struct StubPoseModel {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl StubPoseModel {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl PoseModel for StubPoseModel {
        fn estimate(&self, _sub_image: &Frame) -> Result<Option<LandmarkSet>, PoseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Reply::Landmarks(set) => Ok(Some(set.clone())),
                Reply::NoPose => Ok(None),
                Reply::Fail => Err(PoseError::Inference("boom".into())),
            }
        }
    }

    // --- Helpers ---

    fn sub_image(w: u32, h: u32) -> Frame {
        Frame::new(vec![90; (w * h * 3) as usize], w, h, 3)
    }

    fn landmarks(visibility: f64) -> LandmarkSet {
        LandmarkSet::from_iter([
            (HeadLandmark::Nose, Landmark::new(50, 40, visibility)),
            (HeadLandmark::LeftEye, Landmark::new(40, 30, visibility)),
            (HeadLandmark::RightEye, Landmark::new(60, 30, visibility)),
        ])
    }

    fn detect(model: Arc<StubPoseModel>, frame: &Frame) -> DetectionResult {
        HeadPoseDetector::new(model).detect(frame, &HeadBoxEstimator::default(), 0.5)
    }

    // --- Tests ---

    #[test]
    fn test_confident_landmarks_are_valid() {
        let model = StubPoseModel::new(Reply::Landmarks(landmarks(0.9)));
        let result = detect(model, &sub_image(120, 300));
        assert!(result.is_valid());
        assert_relative_eq!(result.confidence, 0.9, epsilon = 1e-9);
        assert!(result.head_box.is_some());
    }

    #[test]
    fn test_low_confidence_keeps_box_but_is_invalid() {
        let mut set = landmarks(0.9);
        set.insert(HeadLandmark::LeftEar, Landmark::new(30, 35, 0.0));
        set.insert(HeadLandmark::RightEar, Landmark::new(70, 35, 0.0));
        set.insert(HeadLandmark::LeftEyeOuter, Landmark::new(35, 30, 0.0));
        let model = StubPoseModel::new(Reply::Landmarks(set));
        let result = detect(model, &sub_image(120, 300));
        // mean = 2.7 / 6 = 0.45
        assert_relative_eq!(result.confidence, 0.45, epsilon = 1e-9);
        assert!(result.head_box.is_some());
        assert!(!result.is_valid());
        assert_eq!(result.degraded, Some(DegradedReason::LowConfidence));
    }

    #[test]
    fn test_no_pose_is_degraded() {
        let model = StubPoseModel::new(Reply::NoPose);
        let result = detect(model, &sub_image(120, 300));
        assert_eq!(result, DetectionResult::degraded(DegradedReason::NoPoseFound));
    }

    #[test]
    fn test_model_fault_is_absorbed() {
        let model = StubPoseModel::new(Reply::Fail);
        let result = detect(model, &sub_image(120, 300));
        assert!(!result.is_valid());
        assert!(result.head_box.is_none());
        assert_relative_eq!(result.confidence, 0.0);
        assert!(matches!(result.degraded, Some(DegradedReason::ModelFault(_))));
    }

    #[test]
    fn test_small_sub_image_skips_model() {
        let model = StubPoseModel::new(Reply::Landmarks(landmarks(0.9)));
        let result = detect(model.clone(), &sub_image(19, 300));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            result.degraded,
            Some(DegradedReason::SubImageTooSmall {
                width: 19,
                height: 300
            })
        );
    }

    #[test]
    fn test_malformed_visibility_is_degraded() {
        let mut set = landmarks(0.9);
        set.insert(HeadLandmark::LeftEar, Landmark::new(30, 35, f64::NAN));
        let model = StubPoseModel::new(Reply::Landmarks(set));
        let result = detect(model, &sub_image(120, 300));
        assert_eq!(result.degraded, Some(DegradedReason::MalformedLandmarks));
    }

    #[test]
    fn test_single_visible_landmark_is_insufficient() {
        let set = LandmarkSet::from_iter([
            (HeadLandmark::Nose, Landmark::new(50, 40, 0.9)),
            (HeadLandmark::LeftEye, Landmark::new(40, 30, 0.2)),
        ]);
        let model = StubPoseModel::new(Reply::Landmarks(set));
        let result = detect(model, &sub_image(120, 300));
        assert!(result.head_box.is_none());
        assert_eq!(result.degraded, Some(DegradedReason::InsufficientLandmarks));
    }

    #[test]
    fn test_evaluate_threshold_is_inclusive() {
        let b = Some(BoundingBox::new(0, 0, 10, 10));
        assert!(DetectionResult::evaluate(b, 0.5, 0.5).is_valid());
        assert!(!DetectionResult::evaluate(b, 0.49, 0.5).is_valid());
        assert!(!DetectionResult::evaluate(None, 1.0, 0.5).is_valid());
    }
}
