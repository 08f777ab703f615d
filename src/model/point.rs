//! Core geometry types shared by every layer of the annotator.

use serde::{Deserialize, Serialize};

/// A 2D point.
///
/// The same type carries normalized (image-space) and view-space
/// coordinates; function signatures name which one they expect.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Return this point shifted by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Round both coordinates to the nearest integer.
    pub fn rounded(&self) -> Point {
        Point::new(self.x.round(), self.y.round())
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// An axis-aligned box given by its top-left and bottom-right corners.
///
/// Produced by the canonicalization functions in [`crate::geometry`]; a box
/// may be flat on one axis (zero width or height) when the two defining
/// anchors share a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub top_left: Point,
    pub bottom_right: Point,
}

impl Bounds {
    pub const fn new(top_left: Point, bottom_right: Point) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    pub fn width(&self) -> f64 {
        self.bottom_right.x - self.top_left.x
    }

    pub fn height(&self) -> f64 {
        self.bottom_right.y - self.top_left.y
    }

    /// Get the center point of the box.
    pub fn center(&self) -> Point {
        Point::new(
            (self.top_left.x + self.bottom_right.x) / 2.0,
            (self.top_left.y + self.bottom_right.y) / 2.0,
        )
    }

    /// True when the box has zero extent on at least one axis.
    pub fn is_flat(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }

    /// Check if a point is inside the box (edges included).
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.top_left.x
            && point.x <= self.bottom_right.x
            && point.y >= self.top_left.y
            && point.y <= self.bottom_right.y
    }

    /// Smallest box containing every point, or `None` for an empty slice.
    pub fn enclosing(points: &[Point]) -> Option<Bounds> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Bounds::new(min, max))
    }

    /// Intersection of two boxes, `None` when they do not overlap with a
    /// positive area.
    pub fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        let top_left = Point::new(
            self.top_left.x.max(other.top_left.x),
            self.top_left.y.max(other.top_left.y),
        );
        let bottom_right = Point::new(
            self.bottom_right.x.min(other.bottom_right.x),
            self.bottom_right.y.min(other.bottom_right.y),
        );
        if bottom_right.x <= top_left.x || bottom_right.y <= top_left.y {
            return None;
        }
        Some(Bounds::new(top_left, bottom_right))
    }
}
