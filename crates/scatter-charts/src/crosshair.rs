//! Crosshair: pointer position to data-space readout
//!
//! The host may resize the SVG with CSS without re-rendering it, so client pixels
//! are first converted back to the SVG's own coordinate system.

use crate::chartkit::{LinearScale, Scale};
use crate::LayoutState;
use scatter_core::Viewport;

/// Gap between a guide line and its value label
pub const CROSSHAIR_TEXT_MARGIN: f64 = 5.0;
/// Ratios closer to 1 than this are treated as unscaled
pub const SCALE_EPSILON: f64 = 1e-5;

/// CSS scale ratio along one axis, `None` when no correction applies
pub fn scale_ratio(rendered: f64, intrinsic: f64) -> Option<f64> {
    if intrinsic == 0.0 || !intrinsic.is_finite() || !rendered.is_finite() {
        return None;
    }
    let ratio = rendered / intrinsic;
    ((ratio - 1.0).abs() > SCALE_EPSILON && ratio != 0.0).then_some(ratio)
}

/// Convert client-space pointer offsets into SVG coordinates
pub fn correct_pointer(raw: (f64, f64), rendered: Viewport, intrinsic: Viewport) -> (f64, f64) {
    let x = scale_ratio(rendered.width, intrinsic.width).map_or(raw.0, |r| raw.0 / r);
    let y = scale_ratio(rendered.height, intrinsic.height).map_or(raw.1, |r| raw.1 / r);
    (x, y)
}

/// Round for on-screen display
pub fn round_display(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Pointer position in plot pixels and data units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrosshairReadout {
    /// Rounded to 2 decimals
    pub data_x: f64,
    /// Rounded to 2 decimals
    pub data_y: f64,
    pub pixel_x: f64,
    pub pixel_y: f64,
}

/// Map a raw pointer offset (relative to the SVG's client rect) to a readout.
///
/// `layout` supplies the margin so the pixel position is relative to the plotting area.
pub fn map_pointer(
    raw: (f64, f64),
    rendered: Viewport,
    intrinsic: Viewport,
    layout: &LayoutState,
    x_scale: &LinearScale,
    y_scale: &LinearScale,
) -> CrosshairReadout {
    let (x, y) = correct_pointer(raw, rendered, intrinsic);
    let pixel_x = x - layout.margin.left;
    let pixel_y = y - layout.margin.top;
    CrosshairReadout {
        data_x: round_display(x_scale.invert(pixel_x)),
        data_y: round_display(y_scale.invert(pixel_y)),
        pixel_x,
        pixel_y,
    }
}

/// Guide lines and label anchors inside the plotting area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrosshairGeometry {
    /// `(x1, y1, x2, y2)`
    pub vertical: (f64, f64, f64, f64),
    pub horizontal: (f64, f64, f64, f64),
    pub x_label: (f64, f64),
    pub y_label: (f64, f64),
}

impl CrosshairReadout {
    /// Lines span the whole plotting area whatever the pointer position
    pub fn geometry(&self, viewport_in: Viewport) -> CrosshairGeometry {
        CrosshairGeometry {
            vertical: (self.pixel_x, 0.0, self.pixel_x, viewport_in.height),
            horizontal: (0.0, self.pixel_y, viewport_in.width, self.pixel_y),
            x_label: (
                self.pixel_x + CROSSHAIR_TEXT_MARGIN,
                viewport_in.height - CROSSHAIR_TEXT_MARGIN,
            ),
            y_label: (CROSSHAIR_TEXT_MARGIN, self.pixel_y - CROSSHAIR_TEXT_MARGIN),
        }
    }

    pub fn label(&self) -> String {
        format!("({}, {})", self.data_x, self.data_y)
    }
}

/// Crosshair visibility and last readout
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Crosshair {
    pub visible: bool,
    pub readout: Option<CrosshairReadout>,
}

impl Crosshair {
    pub fn enter(&mut self) {
        self.visible = true;
    }

    /// Hide and forget the readout
    pub fn leave(&mut self) {
        self.visible = false;
        self.readout = None;
    }

    pub fn update(&mut self, readout: CrosshairReadout) {
        self.visible = true;
        self.readout = Some(readout);
    }

    /// Readout to draw, only while visible
    pub fn shown(&self) -> Option<CrosshairReadout> {
        self.readout.filter(|_| self.visible)
    }
}
