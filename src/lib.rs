//! Region Annotator
//!
//! Core of an interactive tool for drawing region annotations (ellipses,
//! circles, rectangles and polygons) over large images, combining and cutting
//! them, and persisting them as JSON in image coordinates.
//!
//! The crate is toolkit independent: a host supplies a [`session::Canvas`]
//! and forwards its input events to an [`InteractionSession`].

pub mod boolean_ops;
pub mod config;
pub mod format;
pub mod geometry;
pub mod logging;
pub mod model;
pub mod session;
pub mod store;
pub mod view;

pub use config::AnnotatorConfig;
pub use model::{Annotation, Bounds, Point, Shape, ShapeKind};
pub use session::{Canvas, InteractionSession, Mode, Outcome};
pub use store::AnnotationStore;
pub use view::{ImagePyramid, ViewState};
