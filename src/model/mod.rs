//! Data model: points, shapes and annotation records.

mod annotation;
mod point;
mod shape;

pub use annotation::Annotation;
pub use point::{Bounds, Point};
pub use shape::{MIN_AREA_VERTICES, Shape, ShapeKind};
