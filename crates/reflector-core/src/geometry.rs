use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Integer pixel coordinate, `x` to the right and `y` down.
pub type PixelPoint = Point2<i32>;

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Minimal box covering the pixels at `points`: `max - min + 1` on each
    /// axis, so a single pixel is a 1 x 1 box.
    pub fn enclosing(points: &[PixelPoint]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut max_x) = (first.x, first.x);
        let (mut min_y, mut max_y) = (first.y, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(
            min_x,
            min_y,
            max_x - min_x + 1,
            max_y - min_y + 1,
        ))
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    #[inline]
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    #[inline]
    pub fn center_x(&self) -> f64 {
        self.x as f64 + self.width as f64 / 2.0
    }

    /// Intersect with the `[0, width) x [0, height)` image domain.
    pub fn clamp_to(&self, width: usize, height: usize) -> Option<Self> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = (self.x.saturating_add(self.width)).min(width as i32);
        let y1 = (self.y.saturating_add(self.height)).min(height as i32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self::new(x0, y0, x1 - x0, y1 - y0))
    }
}
