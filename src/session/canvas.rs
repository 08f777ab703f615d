//! Rendering collaborator interface.
//!
//! The session never draws by itself. It hands view-space geometry to a
//! [`Canvas`] and keeps only the handles the canvas gives back, keyed by
//! annotation id.

use std::fmt::Debug;
use std::hash::Hash;

use crate::model::{Bounds, Point, ShapeKind};
use crate::view::ImageTile;

/// Geometry in view coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewGeometry {
    /// Ellipse inscribed in the box
    Oval(Bounds),
    Rectangle(Bounds),
    /// Closed outline
    Polygon(Vec<Point>),
    /// Open line through the points, used for guides
    Polyline(Vec<Point>),
}

impl ViewGeometry {
    /// Smallest box containing the geometry.
    pub fn bounds(&self) -> Bounds {
        match self {
            ViewGeometry::Oval(b) | ViewGeometry::Rectangle(b) => *b,
            ViewGeometry::Polygon(points) | ViewGeometry::Polyline(points) => {
                Bounds::enclosing(points).unwrap_or_default()
            }
        }
    }
}

/// How a primitive is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    /// RGB outline colour
    pub outline: [u8; 3],
    pub fill: Option<[u8; 3]>,
    pub line_width: f64,
    pub visible: bool,
}

impl Style {
    pub fn outline(color: [u8; 3], line_width: f64) -> Self {
        Self {
            outline: color,
            fill: None,
            line_width,
            visible: true,
        }
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

/// A drawing surface that can create, update and hit-test primitives.
pub trait Canvas {
    /// Opaque reference to a drawn primitive.
    type Handle: Copy + Eq + Hash + Debug;

    /// Draw a new primitive. `kind` is `None` for guides that are not
    /// annotations, such as the cut line.
    fn create_shape(
        &mut self,
        kind: Option<ShapeKind>,
        geometry: &ViewGeometry,
        style: &Style,
    ) -> Self::Handle;

    /// Replace the geometry of a primitive, keeping its style. The returned
    /// handle supersedes the one passed in.
    fn update_shape(&mut self, handle: Self::Handle, geometry: &ViewGeometry) -> Self::Handle;

    fn delete_shape(&mut self, handle: Self::Handle);

    /// The topmost primitive at a view point.
    fn hit_test(&self, view_point: Point) -> Option<Self::Handle>;

    fn set_style(&mut self, handle: Self::Handle, style: &Style);

    /// Paint the background image tile.
    fn draw_image(&mut self, _tile: &ImageTile) {}
}
