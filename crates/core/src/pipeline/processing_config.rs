use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detection::domain::fallback_region::FallbackParams;
use crate::detection::domain::head_geometry::HeadGeometryParams;
use crate::shared::constants::{
    CONFIDENCE_THRESHOLD, MIN_RELATIVE_HEIGHT, MIN_SUBFRAME_SIZE, MIN_VISIBLE_LANDMARKS,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    #[default]
    Standard,
    /// Skips people that are small relative to the image.
    Fast,
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingMode::Standard => write!(f, "standard"),
            ProcessingMode::Fast => write!(f, "fast"),
        }
    }
}

impl FromStr for ProcessingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(ProcessingMode::Standard),
            "fast" => Ok(ProcessingMode::Fast),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("mode must be 'standard' or 'fast', got '{0}'")]
    UnknownMode(String),
    #[error("{name} must be between 0.0 and 1.0, got {value}")]
    OutOfUnitRange { name: &'static str, value: f64 },
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },
    #[error("head_geometry.min_visible_landmarks must be at least 2, got {0}")]
    TooFewLandmarks(usize),
}

/// Per-invocation settings for one blur run. Immutable once the run starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub mode: ProcessingMode,
    /// Minimum mean landmark visibility for a pose-derived head box.
    pub confidence_threshold: f64,
    /// Fast-mode cutoff: person height / image height.
    pub min_relative_height: f64,
    /// Person boxes narrower or shorter than this are skipped.
    pub min_subframe_size: i32,
    pub head_geometry: HeadGeometryParams,
    pub fallback: FallbackParams,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            mode: ProcessingMode::Standard,
            confidence_threshold: CONFIDENCE_THRESHOLD,
            min_relative_height: MIN_RELATIVE_HEIGHT,
            min_subframe_size: MIN_SUBFRAME_SIZE,
            head_geometry: HeadGeometryParams::default(),
            fallback: FallbackParams::default(),
        }
    }
}

impl ProcessingConfig {
    pub fn with_mode(mut self, mode: ProcessingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        unit_range("confidence_threshold", self.confidence_threshold)?;
        unit_range("min_relative_height", self.min_relative_height)?;
        unit_range(
            "head_geometry.visibility_threshold",
            self.head_geometry.visibility_threshold,
        )?;
        unit_range("fallback.head_ratio", self.fallback.head_ratio)?;
        non_negative("min_subframe_size", self.min_subframe_size as f64)?;

        let g = &self.head_geometry;
        for (name, value) in [
            ("head_geometry.scale", g.scale),
            ("head_geometry.height_factor", g.height_factor),
            ("head_geometry.width_factor", g.width_factor),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        non_negative("head_geometry.padding", g.padding)?;
        non_negative("head_geometry.aspect_factor", g.aspect_factor)?;
        if !g.vertical_shift.is_finite() {
            return Err(ConfigError::NotFinite {
                name: "head_geometry.vertical_shift",
                value: g.vertical_shift,
            });
        }
        // A single point has no span to measure.
        if g.min_visible_landmarks < MIN_VISIBLE_LANDMARKS {
            return Err(ConfigError::TooFewLandmarks(g.min_visible_landmarks));
        }

        // A negative aspect would let wide and lying boxes through.
        non_negative("fallback.min_aspect", self.fallback.min_aspect)?;
        non_negative(
            "fallback.min_head_height",
            self.fallback.min_head_height as f64,
        )?;
        Ok(())
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

fn unit_range(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { name, value })
    }
}
