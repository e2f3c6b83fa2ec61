//! Head landmark catalogue and per-detection landmark sets.
//!
//! Coordinates are integer pixels in the space of the sub-image the pose
//! model was run on, never the original image.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The fixed set of head-related pose landmarks the pipeline consumes.
///
/// Other body landmarks a pose model may produce are out of scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadLandmark {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
}

impl HeadLandmark {
    pub const ALL: [HeadLandmark; 9] = [
        HeadLandmark::Nose,
        HeadLandmark::LeftEyeInner,
        HeadLandmark::LeftEye,
        HeadLandmark::LeftEyeOuter,
        HeadLandmark::RightEyeInner,
        HeadLandmark::RightEye,
        HeadLandmark::RightEyeOuter,
        HeadLandmark::LeftEar,
        HeadLandmark::RightEar,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HeadLandmark::Nose => "nose",
            HeadLandmark::LeftEyeInner => "left_eye_inner",
            HeadLandmark::LeftEye => "left_eye",
            HeadLandmark::LeftEyeOuter => "left_eye_outer",
            HeadLandmark::RightEyeInner => "right_eye_inner",
            HeadLandmark::RightEye => "right_eye",
            HeadLandmark::RightEyeOuter => "right_eye_outer",
            HeadLandmark::LeftEar => "left_ear",
            HeadLandmark::RightEar => "right_ear",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: i32,
    pub y: i32,
    /// In `[0, 1]`.
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: i32, y: i32, visibility: f64) -> Self {
        Self { x, y, visibility }
    }

    pub fn is_visible(&self, threshold: f64) -> bool {
        self.visibility > threshold
    }
}

/// Head landmarks produced by one pose-model call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LandmarkSet {
    points: BTreeMap<HeadLandmark, Landmark>,
}

impl LandmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: HeadLandmark, landmark: Landmark) {
        self.points.insert(name, landmark);
    }

    pub fn get(&self, name: HeadLandmark) -> Option<&Landmark> {
        self.points.get(&name)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HeadLandmark, &Landmark)> + '_ {
        self.points.iter().map(|(name, lm)| (*name, lm))
    }

    /// Mean visibility over every landmark present; 0.0 for an empty set.
    pub fn mean_visibility(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.points.values().map(|lm| lm.visibility).sum();
        sum / self.points.len() as f64
    }

    /// Points whose visibility is strictly above `threshold`.
    pub fn visible_points(&self, threshold: f64) -> Vec<(i32, i32)> {
        self.points
            .values()
            .filter(|lm| lm.is_visible(threshold))
            .map(|lm| (lm.x, lm.y))
            .collect()
    }
}

impl FromIterator<(HeadLandmark, Landmark)> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = (HeadLandmark, Landmark)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}
