//! Shape kinds and their normalized geometry.

use std::fmt;

use crate::geometry::{
    canonical_circle, canonical_ellipse, canonical_rectangle, center_from_dimensions, centroid,
    polygon_area, tessellate_oval, tessellate_rectangle,
};
use crate::model::{Bounds, Point};

/// Minimum number of vertices for a shape that encloses an area.
pub const MIN_AREA_VERTICES: usize = 3;

/// The closed set of shape kinds the annotator can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShapeKind {
    Ellipse,
    Circle,
    #[default]
    Rectangle,
    Polygon,
}

impl ShapeKind {
    /// All shape kinds, in menu order.
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Ellipse,
        ShapeKind::Circle,
        ShapeKind::Rectangle,
        ShapeKind::Polygon,
    ];

    /// Name used for this kind in the interchange format.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Circle => "circle",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Polygon => "polygon",
        }
    }

    /// Get the display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Ellipse => "Ellipse",
            ShapeKind::Circle => "Circle",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Polygon => "Polygon",
        }
    }

    /// Parse an interchange type name.
    pub fn parse(s: &str) -> Option<ShapeKind> {
        ShapeKind::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    /// Number of anchors that complete a create gesture, `None` for kinds
    /// that accumulate points until an explicit commit.
    pub fn anchor_count(&self) -> Option<usize> {
        match self {
            ShapeKind::Ellipse | ShapeKind::Circle | ShapeKind::Rectangle => Some(2),
            ShapeKind::Polygon => None,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape geometry in normalized image coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Ellipse defined by its center and a far control point; the radii are
    /// the per-axis distances between the two.
    Ellipse { center: Point, edge: Point },
    /// Circle through `edge` centered on `center`.
    Circle { center: Point, edge: Point },
    /// Axis-aligned rectangle.
    Rectangle {
        top_left: Point,
        bottom_right: Point,
    },
    /// Ordered vertices; the order defines the boundary winding.
    Polygon { points: Vec<Point> },
}

impl Shape {
    /// Build the shape a create gesture describes.
    ///
    /// Two-anchor kinds need exactly two anchors (rectangles are stored
    /// canonicalized); polygons take every anchor in order. Returns `None`
    /// when the anchors do not complete the shape.
    pub fn from_anchors(kind: ShapeKind, anchors: &[Point]) -> Option<Shape> {
        match (kind, anchors) {
            (ShapeKind::Ellipse, &[center, edge]) => Some(Shape::Ellipse { center, edge }),
            (ShapeKind::Circle, &[center, edge]) => Some(Shape::Circle { center, edge }),
            (ShapeKind::Rectangle, &[p0, p1]) => {
                let b = canonical_rectangle(p0, p1);
                Some(Shape::Rectangle {
                    top_left: b.top_left,
                    bottom_right: b.bottom_right,
                })
            }
            (ShapeKind::Polygon, points) if !points.is_empty() => Some(Shape::Polygon {
                points: points.to_vec(),
            }),
            _ => None,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Ellipse { .. } => ShapeKind::Ellipse,
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Rectangle { .. } => ShapeKind::Rectangle,
            Shape::Polygon { .. } => ShapeKind::Polygon,
        }
    }

    /// Canonical box of the shape.
    pub fn bounds(&self) -> Bounds {
        match self {
            Shape::Ellipse { center, edge } => canonical_ellipse(*center, *edge),
            Shape::Circle { center, edge } => canonical_circle(*center, *edge),
            Shape::Rectangle {
                top_left,
                bottom_right,
            } => canonical_rectangle(*top_left, *bottom_right),
            Shape::Polygon { points } => Bounds::enclosing(points).unwrap_or_default(),
        }
    }

    /// Radii of an ellipse or circle.
    pub fn radii(&self) -> Option<(f64, f64)> {
        match self {
            Shape::Ellipse { center, edge } => {
                Some(((edge.x - center.x).abs(), (edge.y - center.y).abs()))
            }
            Shape::Circle { center, edge } => {
                let r = center.distance_to(edge);
                Some((r, r))
            }
            Shape::Rectangle { .. } | Shape::Polygon { .. } => None,
        }
    }

    /// Boundary as a closed point sequence (last point implicitly joins the
    /// first). Ovals are sampled with `oval_steps` points.
    pub fn outline(&self, oval_steps: usize) -> Vec<Point> {
        match self {
            Shape::Ellipse { .. } | Shape::Circle { .. } => {
                tessellate_oval(self.bounds(), oval_steps, 0.0)
            }
            Shape::Rectangle { .. } => tessellate_rectangle(self.bounds()).to_vec(),
            Shape::Polygon { points } => points.clone(),
        }
    }

    /// Whether the shape can take part in combine and cut.
    pub fn encloses_area(&self) -> bool {
        match self {
            Shape::Ellipse { .. } | Shape::Circle { .. } | Shape::Rectangle { .. } => {
                !self.bounds().is_flat()
            }
            Shape::Polygon { points } => points.len() >= MIN_AREA_VERTICES,
        }
    }

    /// Enclosed area in square image pixels.
    pub fn area(&self) -> f64 {
        match self {
            Shape::Ellipse { .. } | Shape::Circle { .. } => {
                let (rx, ry) = self.radii().unwrap_or_default();
                std::f64::consts::PI * rx * ry
            }
            Shape::Rectangle { .. } => {
                let b = self.bounds();
                b.width() * b.height()
            }
            Shape::Polygon { points } => polygon_area(points),
        }
    }

    /// The same shape moved so that it is centered on `center`.
    ///
    /// Two-anchor shapes are re-anchored around the new center keeping their
    /// width and height; polygons are translated rigidly so their vertex
    /// average lands on `center`.
    pub fn recentered(&self, center: Point) -> Shape {
        match self {
            Shape::Ellipse { .. } => {
                let b = self.bounds();
                let moved = center_from_dimensions(center, b.width(), b.height());
                Shape::Ellipse {
                    center,
                    edge: moved.bottom_right,
                }
            }
            Shape::Circle { .. } => {
                let b = self.bounds();
                let moved = center_from_dimensions(center, b.width(), b.height());
                Shape::Circle {
                    center,
                    edge: Point::new(moved.bottom_right.x, center.y),
                }
            }
            Shape::Rectangle { .. } => {
                let b = self.bounds();
                let moved = center_from_dimensions(center, b.width(), b.height());
                Shape::Rectangle {
                    top_left: moved.top_left,
                    bottom_right: moved.bottom_right,
                }
            }
            Shape::Polygon { points } => {
                let Some(grab) = centroid(points) else {
                    return self.clone();
                };
                let (dx, dy) = (center.x - grab.x, center.y - grab.y);
                Shape::Polygon {
                    points: points.iter().map(|p| p.translated(dx, dy)).collect(),
                }
            }
        }
    }
}
