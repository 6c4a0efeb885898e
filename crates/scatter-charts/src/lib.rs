//! # scatter-charts
//!
//! D3.js-style scatter/bubble chart built with Leptos.
//! Turns a role-tagged data view into positioned, styled markers with axes,
//! legend and crosshair.
//!
//! ## Architecture
//!
//! Uses Strategy pattern for:
//! - Scale computation (`Scale`)
//! - Label measurement (`TextMeasurer`)
//! - Colour resolution and value formatting (from `scatter-core`)
//!
//! ## Modules
//!
//! - `chartkit` - Core primitives: linear scale, ticks, path builder
//! - `size` - Bubble size projection
//! - `shapes` - Marker shapes
//! - `point` - Plot-ready data point model
//! - `flatten` - Row flattener
//! - `legend` - Legend builder
//! - `axes` - Axis property calculator
//! - `margin` - Margin solver (layout loop)
//! - `crosshair` - Pointer to data-space mapping
//! - `visual` - Update pipeline and render geometry
//! - `scatter` - Leptos SVG component

pub mod axes;
pub mod chartkit;
pub mod crosshair;
pub mod flatten;
pub mod legend;
pub mod margin;
pub mod point;
pub mod scatter;
pub mod shapes;
pub mod size;
pub mod text;
pub mod visual;

pub use axes::*;
pub use chartkit::*;
pub use crosshair::*;
pub use flatten::{FlattenResult, flatten, resolve_axis_sources};
pub use legend::build_legend;
pub use margin::*;
pub use point::*;
pub use scatter::*;
pub use shapes::*;
pub use size::*;
pub use text::*;
pub use visual::*;

// Re-export colors from scatter-core for convenience
pub use scatter_core::colors;

use scatter_core::Viewport;

/// Chart margin in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self { top, right, bottom, left }
    }

    pub const fn uniform(margin: f64) -> Self {
        Self::new(margin, margin, margin, margin)
    }

    /// Inset the layout loop starts from
    pub const fn initial() -> Self {
        Self::new(8.0, 0.0, 25.0, 0.0)
    }

    /// Same margin with every side clamped to `>= 0`
    pub fn non_negative(self) -> Self {
        let clamp = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self::new(
            clamp(self.top),
            clamp(self.right),
            clamp(self.bottom),
            clamp(self.left),
        )
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::initial()
    }
}

/// Outer viewport plus margin; the inner plotting area is always derived, never stored
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutState {
    pub viewport: Viewport,
    pub margin: Margin,
}

impl LayoutState {
    pub fn new(viewport: Viewport, margin: Margin) -> Self {
        Self {
            viewport,
            margin: margin.non_negative(),
        }
    }

    pub fn with_margin(self, margin: Margin) -> Self {
        Self::new(self.viewport, margin)
    }

    /// Plotting area inside the margins
    pub fn viewport_in(&self) -> Viewport {
        Viewport::new(
            (self.viewport.width - self.margin.left - self.margin.right).max(0.0),
            (self.viewport.height - self.margin.top - self.margin.bottom).max(0.0),
        )
    }

    /// SVG transform for the plotting area
    pub fn inner_transform(&self) -> String {
        format!("translate({}, {})", self.margin.left, self.margin.top)
    }

    /// ViewBox string for SVG
    pub fn viewbox(&self) -> String {
        format!("0 0 {} {}", self.viewport.width, self.viewport.height)
    }
}
