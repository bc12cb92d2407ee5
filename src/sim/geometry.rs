//! Axis-aligned geometry for the farmyard board
//!
//! Every entity position is the *center* of its hitbox. Rectangles are derived
//! from center + size and tested with strict inequalities, so touching edges
//! never count as a collision.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Build a rectangle from its center and full size
    #[inline]
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Strict overlap on both axes
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Free-function form of [`Rect::overlaps`]
#[inline]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.overlaps(b)
}

/// Slack allowed when comparing a clamped hitbox against the board edge
const EDGE_EPSILON: f32 = 1e-3;

/// The playing field; owns the coordinate space `[0, width] x [0, height]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub width: f32,
    pub height: f32,
}

impl Board {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Square board measured in grid cells
    pub fn from_cells(cells: u32, cell_size: f32) -> Self {
        let side = cells as f32 * cell_size;
        Self::new(side, side)
    }

    /// Whether a hitbox lies fully inside the board (within float rounding)
    pub fn contains(&self, rect: &Rect) -> bool {
        rect.min.x >= -EDGE_EPSILON
            && rect.min.y >= -EDGE_EPSILON
            && rect.max.x <= self.width + EDGE_EPSILON
            && rect.max.y <= self.height + EDGE_EPSILON
    }

    /// Clamp a center so the hitbox of `size` stays on the board
    pub fn clamp_center(&self, center: Vec2, size: Vec2) -> Vec2 {
        let half = size * 0.5;
        Vec2::new(
            clamp(center.x, half.x, self.width - half.x),
            clamp(center.y, half.y, self.height - half.y),
        )
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Euclidean distance between two points
#[inline]
pub fn distance(p: Vec2, q: Vec2) -> f32 {
    p.distance(q)
}

/// Unit vector along `(dx, dy)`; zero-length input yields `(0, 0)`
#[inline]
pub fn normalize(dx: f32, dy: f32) -> Vec2 {
    Vec2::new(dx, dy).normalize_or_zero()
}

/// Clamp `v` into `[min, max]`
///
/// Unlike `f32::clamp` this never panics: if the range is inverted
/// (board narrower than the hitbox) the lower bound wins.
#[inline]
pub fn clamp(v: f32, min: f32, max: f32) -> f32 {
    v.min(max).max(min)
}

/// Convert a per-second rate into the distance covered in one step
#[inline]
pub fn displacement(speed_per_second: f32, interval_ms: u64) -> f32 {
    speed_per_second * interval_ms as f32 / 1000.0
}

/// Unit vector for an angle in radians
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
