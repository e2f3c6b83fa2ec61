use serde::{Deserialize, Serialize};

use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::{FALLBACK_HEAD_RATIO, FALLBACK_MIN_ASPECT, FALLBACK_MIN_HEAD_HEIGHT};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackParams {
    /// Fraction of the person height taken as the head band.
    pub head_ratio: f64,
    /// Box must satisfy `h > w * min_aspect`.
    pub min_aspect: f64,
    pub min_head_height: i32,
}

impl Default for FallbackParams {
    fn default() -> Self {
        Self {
            head_ratio: FALLBACK_HEAD_RATIO,
            min_aspect: FALLBACK_MIN_ASPECT,
            min_head_height: FALLBACK_MIN_HEAD_HEIGHT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackDecline {
    /// Lying or wide figures: the top of the box is not reliably the head.
    NotUpright { width: i32, height: i32 },
    HeadTooShort { head_height: i32 },
}

impl std::fmt::Display for FallbackDecline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackDecline::NotUpright { width, height } => {
                write!(f, "person not upright (w={width}, h={height})")
            }
            FallbackDecline::HeadTooShort { head_height } => {
                write!(f, "head band too short ({head_height}px)")
            }
        }
    }
}

/// Approximates the head as the top band of an upright person box.
///
/// Used only when pose-based localisation produced nothing trustworthy.
pub fn fallback_head_region(
    person: &BoundingBox,
    params: &FallbackParams,
) -> Result<BoundingBox, FallbackDecline> {
    let (w, h) = (person.width, person.height);
    if (h as f64) <= (w as f64) * params.min_aspect {
        return Err(FallbackDecline::NotUpright {
            width: w,
            height: h,
        });
    }

    // Truncated toward zero: a 250px person gives a 62px band.
    let head_height = (h as f64 * params.head_ratio) as i32;
    if head_height < params.min_head_height {
        return Err(FallbackDecline::HeadTooShort { head_height });
    }

    Ok(BoundingBox::new(person.x, person.y, w, head_height))
}
