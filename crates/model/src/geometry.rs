//! Geometry primitives shared by the scene graph and the host payloads.
//!
//! Stage coordinates use the drawing surface convention:
//! - Origin (0, 0) at the top-left of the page
//! - X increases to the right
//! - Y increases downward
//! - Units are unscaled page units (CSS pixels at 100% zoom)

use serde::{Deserialize, Serialize};

/// Point in stage or group-local space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    pub fn scale(&self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }
}

/// Axis-aligned rectangle, `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalized rectangle spanned by two arbitrary corners
    pub fn from_corners(a: Point, b: Point) -> Self {
        let min_x = a.x.min(b.x);
        let min_y = a.y.min(b.y);
        Self {
            x: min_x,
            y: min_y,
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Smallest rectangle containing every point, `None` when empty
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for point in iter {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains(&self, point: &Point, tolerance: f64) -> bool {
        point.x >= self.x - tolerance
            && point.x <= self.right() + tolerance
            && point.y >= self.y - tolerance
            && point.y <= self.bottom() + tolerance
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    pub fn scale(&self, factor: f64) -> Rect {
        Rect::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }
}

/// RGBA color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// RGB triple as stored by the host annotation storage
    pub fn to_rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
}

/// Group transform: scale, then rotate around the group origin, then translate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Clockwise rotation in degrees (y axis points down)
    pub rotation: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
        }
    }
}

impl Transform {
    pub fn translation(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// Map a group-local point into stage space
    pub fn apply(&self, point: Point) -> Point {
        let sx = point.x * self.scale_x;
        let sy = point.y * self.scale_y;
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        Point::new(self.x + sx * cos - sy * sin, self.y + sx * sin + sy * cos)
    }

    /// Approximate equality, used when comparing re-hydrated geometry
    pub fn approx_eq(&self, other: &Transform, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.scale_x - other.scale_x).abs() <= epsilon
            && (self.scale_y - other.scale_y).abs() <= epsilon
            && (self.rotation - other.rotation).abs() <= epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_from_corners_normalizes() {
        let rect = Rect::from_corners(Point::new(100.0, 60.0), Point::new(10.0, 10.0));
        assert_eq!(rect, Rect::new(10.0, 10.0, 90.0, 50.0));
    }

    #[test]
    fn bounding_of_no_points_is_none() {
        assert!(Rect::bounding(Vec::new()).is_none());
        let rect = Rect::bounding([Point::new(3.0, 4.0), Point::new(-1.0, 9.0)]).unwrap();
        assert_eq!(rect, Rect::new(-1.0, 4.0, 4.0, 5.0));
    }

    #[test]
    fn transform_rotates_clockwise_in_stage_space() {
        let transform = Transform {
            rotation: 90.0,
            ..Transform::translation(10.0, 10.0)
        };
        let mapped = transform.apply(Point::new(5.0, 0.0));
        assert!((mapped.x - 10.0).abs() < 1e-9);
        assert!((mapped.y - 15.0).abs() < 1e-9);
    }

    #[test]
    fn transform_scales_before_translating() {
        let transform = Transform {
            x: 1.0,
            y: 2.0,
            scale_x: 2.0,
            scale_y: 3.0,
            rotation: 0.0,
        };
        assert_eq!(transform.apply(Point::new(1.0, 1.0)), Point::new(3.0, 5.0));
    }

    #[test]
    fn rect_union_covers_both() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 2.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 15.0, 10.0));
    }
}
