//! Object-detector output as consumed by the pipeline.
//!
//! The detector itself is external; only its result shape lives here.
//! Classes other than `person` pass through untouched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::PERSON_CLASS;

#[derive(Error, Debug)]
pub enum DetectionsError {
    #[error("failed to read detections from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed detections: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectDetection {
    pub coordinate: BoundingBox,
    pub confidence: f64,
}

/// Class label → detections, in detector order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectDetections {
    classes: BTreeMap<String, Vec<ObjectDetection>>,
}

impl ObjectDetections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, class: impl Into<String>, detection: ObjectDetection) {
        self.classes.entry(class.into()).or_default().push(detection);
    }

    pub fn class(&self, name: &str) -> &[ObjectDetection] {
        self.classes.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Person boxes at or above `min_confidence`, preserving detector order.
    pub fn person_boxes(&self, min_confidence: f64) -> Vec<BoundingBox> {
        self.class(PERSON_CLASS)
            .iter()
            .filter(|d| d.confidence >= min_confidence)
            .map(|d| d.coordinate)
            .collect()
    }
}

/// Detector result plus the size of the image it ran on.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorOutput {
    pub detections: ObjectDetections,
    /// `(width, height)`; absent when the detector ran on the same raster.
    #[serde(default)]
    pub original_size: Option<(u32, u32)>,
}

impl DetectorOutput {
    pub fn from_json(json: &str) -> Result<Self, DetectionsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, DetectionsError> {
        let json = std::fs::read_to_string(path).map_err(|source| DetectionsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}
