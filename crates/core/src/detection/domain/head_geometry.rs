use serde::{Deserialize, Serialize};

use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::{
    HEAD_ASPECT_FACTOR, HEAD_HEIGHT_FACTOR, HEAD_PADDING, HEAD_SCALE, HEAD_VERTICAL_SHIFT,
    HEAD_WIDTH_FACTOR, LANDMARK_VISIBILITY_THRESHOLD, MIN_VISIBLE_LANDMARKS,
};

use super::head_landmarks::LandmarkSet;

/// Tunables for turning a landmark span into a head box.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadGeometryParams {
    pub visibility_threshold: f64,
    pub min_visible_landmarks: usize,
    /// Extra fractional margin applied to both dimensions.
    pub padding: f64,
    /// Final size multiplier applied after padding.
    pub scale: f64,
    pub height_factor: f64,
    pub width_factor: f64,
    pub aspect_factor: f64,
    pub vertical_shift: f64,
}

impl Default for HeadGeometryParams {
    fn default() -> Self {
        Self {
            visibility_threshold: LANDMARK_VISIBILITY_THRESHOLD,
            min_visible_landmarks: MIN_VISIBLE_LANDMARKS,
            padding: HEAD_PADDING,
            scale: HEAD_SCALE,
            height_factor: HEAD_HEIGHT_FACTOR,
            width_factor: HEAD_WIDTH_FACTOR,
            aspect_factor: HEAD_ASPECT_FACTOR,
            vertical_shift: HEAD_VERTICAL_SHIFT,
        }
    }
}

/// Estimates a full head box from sparse face landmarks.
///
/// Landmarks cluster around the eyes, nose and ears, so their span
/// under-represents the skull. The span is enlarged, the center is lifted
/// toward the crown, and padding/scale are applied. Errs toward covering
/// too much rather than too little.
pub struct HeadBoxEstimator {
    params: HeadGeometryParams,
}

impl HeadBoxEstimator {
    pub fn new(params: HeadGeometryParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &HeadGeometryParams {
        &self.params
    }

    /// Head box in sub-image coordinates, kept within `[0, width] × [0, height]`.
    ///
    /// A box crossing the top or left edge is moved inside rather than cut,
    /// so it keeps its full size; only the right and bottom edges trim it.
    /// Returns `None` with fewer than `min_visible_landmarks` visible points
    /// or when nothing remains.
    pub fn estimate(&self, landmarks: &LandmarkSet, width: u32, height: u32) -> Option<BoundingBox> {
        let p = &self.params;
        let points = landmarks.visible_points(p.visibility_threshold);
        if points.len() < p.min_visible_landmarks.max(1) {
            return None;
        }

        let (min_x, min_y, max_x, max_y) = span(&points);
        let span_w = max_x - min_x;
        let span_h = max_y - min_y;

        let head_h = span_h * p.height_factor;
        let head_w = (span_w * p.width_factor).max(head_h * p.aspect_factor);

        let center_x = (min_x + max_x) / 2.0;
        let center_y = (min_y + max_y) / 2.0 - span_h * p.vertical_shift;

        let final_w = head_w * (1.0 + p.padding) * p.scale;
        let final_h = head_h * (1.0 + p.padding) * p.scale;

        let unclamped = BoundingBox::new(
            (center_x - final_w / 2.0) as i32,
            (center_y - final_h / 2.0) as i32,
            final_w as i32,
            final_h as i32,
        );
        shift_inside(unclamped, width, height)
    }
}

impl Default for HeadBoxEstimator {
    fn default() -> Self {
        Self::new(HeadGeometryParams::default())
    }
}

fn shift_inside(head: BoundingBox, width: u32, height: u32) -> Option<BoundingBox> {
    let x = head.x.max(0);
    let y = head.y.max(0);
    let moved = BoundingBox::new(
        x,
        y,
        head.width.min(width as i32 - x),
        head.height.min(height as i32 - y),
    );
    (!moved.is_degenerate()).then_some(moved)
}

fn span(points: &[(i32, i32)]) -> (f64, f64, f64, f64) {
    let mut min_x = i32::MAX;
    let mut min_y = i32::MAX;
    let mut max_x = i32::MIN;
    let mut max_y = i32::MIN;
    for &(x, y) in points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    (min_x as f64, min_y as f64, max_x as f64, max_y as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::head_landmarks::{HeadLandmark, Landmark};
    use rstest::rstest;

    fn set(points: &[(HeadLandmark, i32, i32, f64)]) -> LandmarkSet {
        points
            .iter()
            .map(|&(name, x, y, v)| (name, Landmark::new(x, y, v)))
            .collect()
    }

    fn frontal() -> LandmarkSet {
        set(&[
            (HeadLandmark::Nose, 50, 40, 0.9),
            (HeadLandmark::LeftEye, 40, 30, 0.9),
            (HeadLandmark::RightEye, 60, 30, 0.9),
        ])
    }

    fn unpadded() -> HeadBoxEstimator {
        HeadBoxEstimator::new(HeadGeometryParams {
            padding: 0.0,
            scale: 1.0,
            ..HeadGeometryParams::default()
        })
    }

    // ── Insufficient evidence ───────────────────────────────────────

    #[test]
    fn test_empty_set_is_none() {
        assert!(HeadBoxEstimator::default()
            .estimate(&LandmarkSet::new(), 200, 400)
            .is_none());
    }

    #[test]
    fn test_single_visible_point_is_none() {
        let lm = set(&[
            (HeadLandmark::Nose, 50, 40, 0.9),
            (HeadLandmark::LeftEye, 40, 30, 0.3),
            (HeadLandmark::RightEye, 60, 30, 0.5),
        ]);
        assert!(HeadBoxEstimator::default().estimate(&lm, 200, 400).is_none());
    }

    #[test]
    fn test_coincident_points_give_no_box() {
        let lm = set(&[
            (HeadLandmark::Nose, 50, 40, 0.9),
            (HeadLandmark::LeftEye, 50, 40, 0.9),
        ]);
        assert!(HeadBoxEstimator::default().estimate(&lm, 200, 400).is_none());
    }

    // ── Geometry ────────────────────────────────────────────────────

    #[test]
    fn test_frontal_without_padding() {
        // span 20x10 → head 30x20, center (50, 35 - 3) = (50, 32)
        let b = unpadded().estimate(&frontal(), 200, 400).unwrap();
        assert_eq!(b, BoundingBox::new(35, 22, 30, 20));
    }

    #[test]
    fn test_frontal_with_default_padding_and_scale() {
        // head 30x20 scaled by 1.2 * 2.0 → 72x48 around (50, 32)
        let b = HeadBoxEstimator::default()
            .estimate(&frontal(), 200, 400)
            .unwrap();
        assert_eq!(b, BoundingBox::new(14, 8, 72, 48));
    }

    #[test]
    fn test_narrow_span_uses_aspect_width() {
        // Vertical-only span: width 0, height 20 → head 32x40
        let lm = set(&[
            (HeadLandmark::Nose, 100, 60, 0.9),
            (HeadLandmark::LeftEye, 100, 40, 0.9),
        ]);
        let b = unpadded().estimate(&lm, 200, 400).unwrap();
        assert_eq!(b.width, 32);
        assert_eq!(b.height, 40);
    }

    #[test]
    fn test_center_is_lifted_above_landmarks() {
        let b = unpadded().estimate(&frontal(), 200, 400).unwrap();
        let center_y = b.y as f64 + b.height as f64 / 2.0;
        assert!(center_y < 35.0);
    }

    #[test]
    fn test_box_near_corner_is_clamped() {
        let lm = set(&[
            (HeadLandmark::LeftEye, 2, 2, 0.9),
            (HeadLandmark::RightEye, 12, 6, 0.9),
        ]);
        let b = HeadBoxEstimator::default().estimate(&lm, 50, 50).unwrap();
        assert_eq!(b.x, 0);
        assert_eq!(b.y, 0);
        assert!(b.right() <= 50 && b.bottom() <= 50);
    }

    #[test]
    fn test_box_above_top_edge_keeps_full_height() {
        // Center lifted to y=22, so the 48px box would start at y=-2
        let lm = set(&[
            (HeadLandmark::LeftEye, 40, 20, 0.9),
            (HeadLandmark::RightEye, 60, 30, 0.9),
        ]);
        let b = HeadBoxEstimator::default().estimate(&lm, 200, 400).unwrap();
        assert_eq!(b, BoundingBox::new(14, 0, 72, 48));
    }

    #[test]
    fn test_box_past_left_edge_keeps_full_width() {
        let lm = set(&[
            (HeadLandmark::LeftEye, 0, 100, 0.9),
            (HeadLandmark::RightEye, 20, 110, 0.9),
        ]);
        // head 30x20 around (10, 102) → x=-5, moved to 0 with width 30
        let b = unpadded().estimate(&lm, 200, 400).unwrap();
        assert_eq!(b, BoundingBox::new(0, 92, 30, 20));
    }

    #[test]
    fn test_box_past_bottom_right_is_trimmed() {
        let lm = set(&[
            (HeadLandmark::LeftEye, 180, 390, 0.9),
            (HeadLandmark::RightEye, 200, 400, 0.9),
        ]);
        // head 30x20 around (190, 392) → (175, 382), trimmed to 25x18
        let b = unpadded().estimate(&lm, 200, 400).unwrap();
        assert_eq!(b, BoundingBox::new(175, 382, 25, 18));
    }

    #[test]
    fn test_invisible_landmarks_do_not_extend_span() {
        let mut lm = frontal();
        lm.insert(HeadLandmark::LeftEar, Landmark::new(0, 0, 0.1));
        let with_ear = unpadded().estimate(&lm, 200, 400);
        let without = unpadded().estimate(&frontal(), 200, 400);
        assert_eq!(with_ear, without);
    }

    #[rstest]
    #[case::centered(200, 400, (40, 30), (60, 45))]
    #[case::top_left(40, 40, (1, 1), (9, 12))]
    #[case::bottom_right(64, 64, (55, 58), (63, 63))]
    #[case::tiny_canvas(10, 10, (2, 3), (7, 8))]
    #[case::wide_span(300, 100, (10, 50), (290, 55))]
    fn test_result_is_inside_sub_image(
        #[case] width: u32,
        #[case] height: u32,
        #[case] a: (i32, i32),
        #[case] b: (i32, i32),
    ) {
        let lm = set(&[
            (HeadLandmark::LeftEye, a.0, a.1, 0.9),
            (HeadLandmark::RightEar, b.0, b.1, 0.9),
        ]);
        let canvas = BoundingBox::new(0, 0, width as i32, height as i32);
        let head = HeadBoxEstimator::default().estimate(&lm, width, height).unwrap();
        assert!(!head.is_degenerate());
        assert!(canvas.contains(&head), "{head} escapes {canvas}");
    }
}
