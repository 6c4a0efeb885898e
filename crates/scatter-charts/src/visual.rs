//! Update pipeline and render geometry
//!
//! Every host update runs flatten → axes → margin solver to completion and yields a
//! [`ScatterFrame`]. Marker geometry (radius, path, opacity) is derived from the frame
//! on demand since it depends on the current plotting area and selection.

use crate::axes::{AxisOptions, ForcedDomain};
use crate::flatten::flatten;
use crate::legend::build_legend;
use crate::margin::{LayoutContext, LayoutSolution, solve_margins};
use crate::point::{DataPoint, LegendData, TooltipItem};
use crate::size::{SizeRange, bubble_radius};
use crate::chartkit::Scale;
use crate::text::{ApproxTextMeasurer, TextMeasurer};
use crate::LayoutState;
use scatter_core::{DataView, PaletteColorResolver, Viewport, VisualSettings};
use std::collections::HashSet;
use std::sync::Arc;

pub const DEFAULT_OPACITY: f64 = 0.85;
pub const DIMMED_OPACITY: f64 = 0.4;
/// Shape area per squared radius
pub const RADIUS_AREA_MULTIPLIER: f64 = 4.0;
/// Gap between a marker and its category label
pub const CATEGORY_LABEL_GAP: f64 = 3.0;

// ============================================================================
// SELECTION
// ============================================================================

/// What a click selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectTarget {
    Point(String),
    Series(String),
    Clear,
}

/// Selected point identity keys and series keys
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub points: HashSet<String>,
    pub series: HashSet<String>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.series.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.series.clear();
    }

    /// Apply a click; `multi` toggles instead of replacing.
    ///
    /// Clicking the only selected item clears the selection.
    pub fn apply(&mut self, target: SelectTarget, multi: bool) {
        let (is_point, key) = match target {
            SelectTarget::Clear => return self.clear(),
            SelectTarget::Point(key) => (true, key),
            SelectTarget::Series(key) => (false, key),
        };
        let set = if is_point {
            &mut self.points
        } else {
            &mut self.series
        };
        if multi {
            if !set.remove(&key) {
                set.insert(key);
            }
            return;
        }

        let only_this = set.len() == 1 && set.contains(&key);
        let only_this = only_this && self.points.len() + self.series.len() == 1;
        self.clear();
        if !only_this {
            if is_point {
                self.points.insert(key);
            } else {
                self.series.insert(key);
            }
        }
    }

    pub fn contains(&self, point: &DataPoint) -> bool {
        self.points.contains(&point.identity.key)
            || self.series.contains(&point.identity.series_key)
    }
}

// ============================================================================
// FRAME
// ============================================================================

/// Backdrop image whose natural size is known (loaded)
#[derive(Debug, Clone, PartialEq)]
pub struct BackdropImage {
    pub url: String,
    pub size: Viewport,
}

/// Everything the renderer needs for one update
#[derive(Debug, Clone)]
pub struct ScatterFrame {
    pub points: Vec<DataPoint>,
    pub legend: LegendData,
    pub solution: LayoutSolution,
    pub size_range: Option<SizeRange>,
    pub settings: VisualSettings,
    /// Backdrop to draw (and load, if its size is not known yet)
    pub backdrop_url: Option<String>,
    pub has_dynamic_series: bool,
    pub has_highlights: bool,
    pub has_size: bool,
    pub use_shape: bool,
    pub use_custom_color: bool,
    /// Measurer the layout was solved with; rendering wraps labels with it too
    pub measurer: Arc<dyn TextMeasurer>,
}

/// Render-ready marker
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub key: String,
    pub series_key: String,
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub path: String,
    pub transform: String,
    /// `None` renders hollow
    pub fill: Option<String>,
    pub stroke: String,
    pub stroke_width: f64,
    pub opacity: f64,
    pub image: Option<String>,
    pub label: Option<String>,
    /// Baseline of the category label, just above the marker
    pub label_y: f64,
    pub tooltip: Vec<TooltipItem>,
}

impl ScatterFrame {
    pub fn layout(&self) -> &LayoutState {
        &self.solution.layout
    }

    pub fn viewport_in(&self) -> Viewport {
        self.solution.layout.viewport_in()
    }

    pub fn legend_visible(&self) -> bool {
        self.settings.legend.show && !self.legend.is_empty()
    }

    pub fn has_selection(&self) -> bool {
        self.points.iter().any(|p| p.selected)
    }

    /// Reconcile `selected` flags with the host selection
    pub fn apply_selection(&mut self, selection: &Selection) {
        for point in &mut self.points {
            point.selected = selection.contains(point);
        }
        for entry in &mut self.legend.data_points {
            entry.selected = selection.series.contains(&entry.identity);
        }
    }

    fn opacity(&self, point: &DataPoint, has_selection: bool) -> f64 {
        let dimmed = (has_selection && !point.selected) || (self.has_highlights && !point.highlight);
        if dimmed { DIMMED_OPACITY } else { DEFAULT_OPACITY }
    }

    /// Markers in paint order: largest bubbles first so small ones stay visible
    pub fn markers(&self) -> Vec<Marker> {
        let axes = &self.solution.axes;
        let viewport_in = self.viewport_in();
        let has_selection = self.has_selection();
        let labels = &self.settings.category_labels;

        let mut order: Vec<&DataPoint> = self.points.iter().collect();
        order.sort_by(|a, b| {
            let size = |p: &DataPoint| p.size_value().unwrap_or(f64::NEG_INFINITY);
            size(b).total_cmp(&size(a))
        });

        order
            .into_iter()
            .map(|point| {
                let cx = axes.x.scale.scale(point.x);
                let cy = axes.y.scale.scale(point.y);
                let radius =
                    bubble_radius(point.size_value(), self.size_range.as_ref(), viewport_in);
                let label = labels
                    .show
                    .then(|| point.formatted_category.get().to_string())
                    .filter(|l| !l.is_empty());
                Marker {
                    key: point.identity.key.clone(),
                    series_key: point.identity.series_key.clone(),
                    cx,
                    cy,
                    radius,
                    path: point.shape.path(RADIUS_AREA_MULTIPLIER * radius * radius),
                    transform: format!("translate({cx:.2}, {cy:.2}) rotate({})", point.rotation),
                    fill: point.fill.clone(),
                    stroke: point.stroke.clone(),
                    stroke_width: point.stroke_width,
                    opacity: self.opacity(point, has_selection),
                    image: point.image.clone(),
                    label,
                    label_y: cy - radius - CATEGORY_LABEL_GAP,
                    tooltip: point.tooltip_info.clone(),
                }
            })
            .collect()
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// The visual: owns the label measurement strategy and runs updates
pub struct ScatterVisual {
    measurer: Arc<dyn TextMeasurer>,
}

impl ScatterVisual {
    pub fn new() -> Self {
        Self {
            measurer: Arc::new(ApproxTextMeasurer),
        }
    }

    pub fn with_measurer(mut self, measurer: impl TextMeasurer + 'static) -> Self {
        self.measurer = Arc::new(measurer);
        self
    }

    /// Run the full pipeline for one host update.
    ///
    /// `backdrop` is the loaded backdrop image, if any; it only takes effect when its
    /// URL matches the backdrop this update wants to draw.
    pub fn update(
        &self,
        view: &DataView,
        settings: &VisualSettings,
        viewport: Viewport,
        backdrop: Option<&BackdropImage>,
    ) -> ScatterFrame {
        let mut colors =
            PaletteColorResolver::new().with_default_color(settings.data_point.default_color.clone());
        let legend = build_legend(view, &settings.legend, &mut colors);
        let flat = flatten(view, settings, &mut colors);

        let first = flat.data_points.first();
        let x_forced = ForcedDomain::resolve(
            &settings.category_axis,
            first.and_then(|p| p.x_start),
            first.and_then(|p| p.x_end),
        );
        let y_forced = ForcedDomain::resolve(
            &settings.value_axis,
            first.and_then(|p| p.y_start),
            first.and_then(|p| p.y_end),
        );

        let backdrop_url = if settings.backdrop.show {
            first
                .and_then(|p| p.backdrop.clone())
                .or_else(|| settings.backdrop.active_url().map(str::to_string))
        } else {
            None
        };
        let backdrop_size = backdrop
            .filter(|image| backdrop_url.as_deref() == Some(image.url.as_str()))
            .map(|image| image.size);

        let ctx = LayoutContext {
            points: &flat.data_points,
            x: AxisOptions::new(&settings.category_axis, flat.x_source.as_ref()).with_forced(x_forced),
            y: AxisOptions::new(&settings.value_axis, flat.y_source.as_ref()).with_forced(y_forced),
            y_on_right: settings.value_axis.position_right,
            measurer: self.measurer.as_ref(),
        };
        let solution = solve_margins(&ctx, viewport, backdrop_size);

        tracing::info!(
            "Scatter update: {} points, {}x{} plot area",
            flat.data_points.len(),
            solution.layout.viewport_in().width,
            solution.layout.viewport_in().height
        );

        ScatterFrame {
            points: flat.data_points,
            legend,
            solution,
            size_range: flat.size_range,
            settings: settings.clone(),
            backdrop_url,
            has_dynamic_series: flat.has_dynamic_series,
            has_highlights: flat.has_highlights,
            has_size: flat.has_size,
            use_shape: flat.use_shape,
            use_custom_color: flat.use_custom_color,
            measurer: Arc::clone(&self.measurer),
        }
    }
}

impl Default for ScatterVisual {
    fn default() -> Self {
        Self::new()
    }
}
