//! View transform and image sampling.
//!
//! [`ViewState`] holds zoom and pan and maps between view and normalized
//! coordinates; [`ImagePyramid`] supplies image pixels at the resolution the
//! current zoom needs.

mod pyramid;
mod transform;

pub use pyramid::{DEFAULT_MIN_DIMENSION, ImagePyramid, ImageTile, level_dimensions};
pub use transform::{CropBox, DEFAULT_MAX_SCALE, DEFAULT_ZOOM_STEP, ViewState, VisibleRegion};
