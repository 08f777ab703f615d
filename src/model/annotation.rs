//! Annotation records.

use uuid::Uuid;

use crate::model::{Shape, ShapeKind};

/// A single annotation on the image.
///
/// The `id` is the only stable reference to an annotation; rendering handles
/// come and go as shapes are moved, combined or cut.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Unique identifier for this annotation.
    pub id: Uuid,
    /// Geometry in normalized image coordinates.
    pub shape: Shape,
    /// Area reported by an external producer, if any.
    pub area: Option<f64>,
    /// Detection accuracy in `[0, 1]` reported by an external producer.
    pub accuracy: Option<f64>,
}

impl Annotation {
    /// Create a new annotation with a fresh random id.
    pub fn new(shape: Shape) -> Self {
        Self::with_id(Uuid::new_v4(), shape)
    }

    /// Create an annotation that keeps an existing id.
    pub fn with_id(id: Uuid, shape: Shape) -> Self {
        Self {
            id,
            shape,
            area: None,
            accuracy: None,
        }
    }

    pub fn with_area(mut self, area: Option<f64>) -> Self {
        self.area = area;
        self
    }

    pub fn with_accuracy(mut self, accuracy: Option<f64>) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }
}
