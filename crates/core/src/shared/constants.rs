//! Tuning constants shared across the pipeline.
//!
//! The head-geometry factors are empirically tuned and have not been
//! recalibrated against a labelled set; they are exposed through
//! `HeadGeometryParams` so callers can override them.

/// Landmarks at or below this visibility do not count as evidence.
pub const LANDMARK_VISIBILITY_THRESHOLD: f64 = 0.5;

/// Fewest visible landmarks from which a head box is estimated.
pub const MIN_VISIBLE_LANDMARKS: usize = 2;

pub const HEAD_PADDING: f64 = 0.2;
pub const HEAD_SCALE: f64 = 2.0;

/// Landmark span → full head height.
pub const HEAD_HEIGHT_FACTOR: f64 = 2.0;
/// Landmark span → full head width.
pub const HEAD_WIDTH_FACTOR: f64 = 1.5;
/// Minimum width as a fraction of the estimated head height.
pub const HEAD_ASPECT_FACTOR: f64 = 0.8;
/// Upward center shift as a fraction of the landmark span height.
pub const HEAD_VERTICAL_SHIFT: f64 = 0.3;

/// Fraction of the person box height treated as the head by the fallback.
pub const FALLBACK_HEAD_RATIO: f64 = 0.25;
/// Person boxes must be taller than `width * FALLBACK_MIN_ASPECT` to qualify.
pub const FALLBACK_MIN_ASPECT: f64 = 1.5;
pub const FALLBACK_MIN_HEAD_HEIGHT: i32 = 5;

/// Mean head-landmark visibility required to trust a pose result.
pub const CONFIDENCE_THRESHOLD: f64 = 0.5;
/// Fast mode skips people shorter than this fraction of the image height.
pub const MIN_RELATIVE_HEIGHT: f64 = 0.10;
pub const MIN_SUBFRAME_SIZE: i32 = 30;
/// Sub-images below this size are never sent to the pose model.
pub const MIN_POSE_INPUT_SIZE: u32 = 20;

pub const BLUR_KERNEL_SIZE: usize = 99;
pub const BLUR_SIGMA: f64 = 30.0;

pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Detector class label for people.
pub const PERSON_CLASS: &str = "person";
/// Person detections below this confidence are discarded.
pub const PERSON_MIN_CONFIDENCE: f64 = 0.40;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
