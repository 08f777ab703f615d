//! Interaction modes.

use std::fmt;

/// What a click on the canvas does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Place anchors of a new shape
    #[default]
    Create,
    /// Pick one shape and drag it with the pointer
    Move,
    /// Mark shapes for deletion
    Delete,
    /// Mark shapes to be merged into one polygon
    Combine,
    /// Split the shape under a two-click line
    Cut,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Create,
        Mode::Move,
        Mode::Delete,
        Mode::Combine,
        Mode::Cut,
    ];

    /// Get the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Create => "Create",
            Mode::Move => "Move",
            Mode::Delete => "Delete",
            Mode::Combine => "Combine",
            Mode::Cut => "Cut",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mouse-wheel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Multiplicative factor for a configured zoom step below 1.
    pub fn factor(&self, step: f64) -> f64 {
        match self {
            ZoomDirection::In => 1.0 / step,
            ZoomDirection::Out => step,
        }
    }
}
