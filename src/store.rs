//! Annotation store.
//!
//! The single source of truth for annotation data. Records are keyed by
//! UUID and iterated in insertion order; rendering handles never enter the
//! store.

use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

use crate::format::{self, FormatError, LoadPolicy};
use crate::model::{Annotation, Shape, ShapeKind};

/// Errors raised by store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("annotation {0} not found")]
    NotFound(Uuid),

    #[error("cannot change a {expected} into a {found}")]
    KindMismatch {
        expected: ShapeKind,
        found: ShapeKind,
    },

    #[error(transparent)]
    Format(#[from] FormatError),
}

// ============================================================================
// Annotation Store
// ============================================================================

/// Storage for the annotations of one image.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    /// Ids in insertion order.
    order: Vec<Uuid>,
    /// All annotations, keyed by their id.
    annotations: HashMap<Uuid, Annotation>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new annotation and return its freshly generated id.
    pub fn add(&mut self, shape: Shape, area: Option<f64>, accuracy: Option<f64>) -> Uuid {
        let annotation = Annotation::new(shape)
            .with_area(area)
            .with_accuracy(accuracy);
        let id = annotation.id;
        self.insert(annotation);
        id
    }

    /// Insert an annotation keeping its id.
    ///
    /// An annotation whose id is already present replaces the stored record
    /// in place, keeping its position in the iteration order.
    pub fn insert(&mut self, annotation: Annotation) {
        let id = annotation.id;
        if self.annotations.insert(id, annotation).is_some() {
            log::debug!("Replaced annotation {}", id);
        } else {
            self.order.push(id);
        }
    }

    /// Replace the geometry of an annotation. The shape kind is immutable.
    pub fn edit(&mut self, id: Uuid, shape: Shape) -> Result<(), StoreError> {
        let annotation = self
            .annotations
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;

        let expected = annotation.kind();
        let found = shape.kind();
        if expected != found {
            return Err(StoreError::KindMismatch { expected, found });
        }

        annotation.shape = shape;
        Ok(())
    }

    /// Remove an annotation and return it.
    pub fn delete(&mut self, id: Uuid) -> Result<Annotation, StoreError> {
        let removed = self
            .annotations
            .remove(&id)
            .ok_or(StoreError::NotFound(id))?;
        self.order.retain(|other| *other != id);
        Ok(removed)
    }

    /// Get the geometry and kind of an annotation.
    pub fn get(&self, id: Uuid) -> Result<(&Shape, ShapeKind), StoreError> {
        self.annotations
            .get(&id)
            .map(|a| (&a.shape, a.kind()))
            .ok_or(StoreError::NotFound(id))
    }

    /// Get the full record of an annotation.
    pub fn annotation(&self, id: Uuid) -> Option<&Annotation> {
        self.annotations.get(&id)
    }

    /// Iterate over all annotations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Annotation, Uuid)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.annotations.get(id).map(|a| (a, *id)))
    }

    /// All ids in insertion order.
    pub fn ids(&self) -> Vec<Uuid> {
        self.order.clone()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.annotations.contains_key(&id)
    }

    /// Get the number of annotations.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if there are no annotations.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Clear all annotations.
    pub fn clear(&mut self) {
        self.order.clear();
        self.annotations.clear();
    }

    // ========================================================================
    // Import/Export
    // ========================================================================

    /// Load a document, rejecting unknown shape kinds.
    pub fn load(&mut self, bytes: &[u8]) -> Result<Vec<Uuid>, StoreError> {
        self.load_with(bytes, LoadPolicy::Strict)
    }

    /// Load a document with the given policy for unknown shape kinds.
    ///
    /// The whole document is parsed before anything is inserted, so a
    /// failing load leaves the store untouched. Returns the ids of the loaded
    /// annotations in document order.
    pub fn load_with(&mut self, bytes: &[u8], policy: LoadPolicy) -> Result<Vec<Uuid>, StoreError> {
        let annotations = format::parse_document(bytes, policy)?;

        let mut ids = Vec::with_capacity(annotations.len());
        for annotation in annotations {
            if self.contains(annotation.id) {
                log::info!("Loaded annotation {} replaces an existing one", annotation.id);
            }
            ids.push(annotation.id);
            self.insert(annotation);
        }

        log::debug!("Loaded {} annotations, store holds {}", ids.len(), self.len());
        Ok(ids)
    }

    /// Serialize every annotation in insertion order.
    pub fn save(&self) -> Result<Vec<u8>, StoreError> {
        Ok(format::write_document(self.iter().map(|(a, _)| a))?)
    }
}
