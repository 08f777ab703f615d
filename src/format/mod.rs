//! Annotation interchange format.
//!
//! Annotations are persisted as a JSON array of shape objects in normalized
//! image coordinates, so saved files do not depend on the zoom or pan the
//! annotations were drawn at.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use region_annotator::format::{self, LoadPolicy};
//!
//! let annotations = format::read_file(path, LoadPolicy::Strict)?;
//! format::write_file(out_path, &annotations)?;
//! ```

mod error;
mod interchange;

#[cfg(test)]
mod tests;

pub use error::FormatError;
pub use interchange::{
    LoadPolicy, OvalEntry, PolygonEntry, RectangleEntry, ShapeEntry, parse_document, read_file,
    write_document, write_file,
};
