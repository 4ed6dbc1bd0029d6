//! Coordinate spaces and the view transform.
//!
//! Three spaces are in play:
//!
//! - **Screen**: raw pointer coordinates relative to the host window.
//! - **Viewport**: screen minus the canvas container's top-left corner.
//! - **World**: diagram coordinates, invariant under pan and zoom.
//!
//! `ViewTransform` maps world → viewport as `world * scale + offset`.
//! Every function here is pure arithmetic; `scale` is clamped away from zero,
//! so the inverse never divides by zero.

use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed zoom factor.
pub const SCALE_MIN: f64 = 0.2;
/// Largest allowed zoom factor.
pub const SCALE_MAX: f64 = 3.0;
/// Snap-to-grid pitch, in world units.
pub const GRID_SIZE: f64 = 20.0;

/// Pan offset plus zoom factor.
///
/// `x, y` are the viewport-space position of the world origin; `scale` maps
/// world units to pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
    };

    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self {
            x,
            y,
            scale: clamp_scale(scale, SCALE_MIN, SCALE_MAX),
        }
    }

    /// The pan offset as a vector.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        self.x = offset.x;
        self.y = offset.y;
    }

    /// Viewport → world: `(v - offset) / scale`.
    pub fn to_world(&self, viewport: Point) -> Point {
        ((viewport.to_vec2() - self.offset()) / self.scale).to_point()
    }

    /// World → viewport: `world * scale + offset`.
    pub fn to_viewport(&self, world: Point) -> Point {
        (world.to_vec2() * self.scale + self.offset()).to_point()
    }

    /// Scale a world-space extent into viewport pixels.
    pub fn scale_size(&self, size: Size) -> Size {
        Size::new(size.width * self.scale, size.height * self.scale)
    }

    /// Zoom by `factor` keeping the world point under `anchor` fixed.
    ///
    /// The resulting scale is clamped to `[scale_min, scale_max]`, and the
    /// offset is recomputed from the clamped scale so the anchor invariant
    /// holds even when the clamp kicks in.
    pub fn zoom_around(&self, anchor: Point, factor: f64, scale_min: f64, scale_max: f64) -> Self {
        let world_anchor = self.to_world(anchor);
        let scale = clamp_scale(self.scale * factor, scale_min, scale_max);
        let offset = anchor.to_vec2() - world_anchor.to_vec2() * scale;
        Self {
            x: offset.x,
            y: offset.y,
            scale,
        }
    }

    /// Repair a transform read from untrusted data: non-finite offsets reset
    /// to zero and the scale is clamped into range.
    pub fn sanitized(self) -> Self {
        let finite_or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };
        let scale = if self.scale.is_finite() {
            clamp_scale(self.scale, SCALE_MIN, SCALE_MAX)
        } else {
            1.0
        };
        Self {
            x: finite_or_zero(self.x),
            y: finite_or_zero(self.y),
            scale,
        }
    }
}

/// The canvas container's dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Geometric center, in viewport space. Zoom is anchored here.
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Screen → viewport: subtract the container's top-left corner.
pub fn screen_to_viewport(screen: Point, container_origin: Point) -> Point {
    (screen - container_origin).to_point()
}

/// Round a world coordinate to the nearest multiple of `grid`.
pub fn snap(value: f64, grid: f64) -> f64 {
    (value / grid).round() * grid
}

/// Snap both coordinates of a world point.
pub fn snap_point(p: Point, grid: f64) -> Point {
    Point::new(snap(p.x, grid), snap(p.y, grid))
}

/// Unlike `f64::clamp`, never panics on an inverted range (`max` wins).
fn clamp_scale(scale: f64, min: f64, max: f64) -> f64 {
    scale.max(min).min(max)
}
