//! # scatter-core
//!
//! Core domain types for the scatter/bubble visual.
//! Implements Strategy pattern for value formatting and colour resolution.
//!
//! ## Modules
//!
//! - `dataview` - Role-tagged tabular input handed over by the host
//! - `format` - Display units, number and date formatters
//! - `settings` - Visual configuration (serde, defaults everywhere)
//! - `colors` - Palette, colour resolution strategy, colour constants

pub mod colors;
pub mod dataview;
pub mod format;
pub mod settings;

pub use colors::{ColorResolver, PaletteColorResolver};
pub use dataview::*;
pub use format::*;
pub use settings::*;

use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

/// Errors raised while reading host input.
///
/// The rendering pipeline never surfaces these to the user: they are logged and
/// folded into an empty frame.
#[derive(Debug, Error)]
pub enum ScatterError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("required role {0} is not bound to any column")]
    MissingRole(Role),
}

pub type Result<T> = std::result::Result<T, ScatterError>;

// ============================================================================
// GEOMETRY VALUE TYPES
// ============================================================================

/// Width/height pair in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Smallest side, used by the bubble area ratio
    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }
}
