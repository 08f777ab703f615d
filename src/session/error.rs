//! Error types for session commands.

use thiserror::Error;

use crate::format::FormatError;
use crate::store::StoreError;

/// Errors from session commands that touch files or the image.
///
/// Gestures never fail; they report what happened through
/// [`crate::session::Outcome`].
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("format error: {0}")]
    Format(#[from] FormatError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no image is open")]
    NoImage,
}
