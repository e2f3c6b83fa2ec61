use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle `(x, y, w, h)` with a top-left origin.
///
/// Serialised as a `[x, y, w, h]` array, the shape object detectors emit.
/// A box with `w <= 0` or `h <= 0` is degenerate and is never handed to a
/// blurrer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Intersection with the `[0, width] × [0, height]` canvas.
    ///
    /// Returns `None` when nothing of the box lies inside the canvas.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<BoundingBox> {
        if self.is_degenerate() {
            return None;
        }
        let max_x = i32::try_from(width).unwrap_or(i32::MAX);
        let max_y = i32::try_from(height).unwrap_or(i32::MAX);

        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = self.right().min(max_x);
        let y2 = self.bottom().min(max_y);

        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(BoundingBox::new(x1, y1, x2 - x1, y2 - y1))
    }

    /// Moves a box expressed relative to `origin` into the origin's frame.
    pub fn offset_by(&self, origin: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.x.saturating_add(origin.x),
            self.y.saturating_add(origin.y),
            self.width,
            self.height,
        )
    }

    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

impl From<[i32; 4]> for BoundingBox {
    fn from([x, y, w, h]: [i32; 4]) -> Self {
        BoundingBox::new(x, y, w, h)
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x, b.y, b.width, b.height]
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "x={}, y={}, w={}, h={}",
            self.x, self.y, self.width, self.height
        )
    }
}
