//! Margin solver
//!
//! Margins depend on tick label sizes, tick labels depend on the plotting area, and the
//! plotting area depends on the margins. The loop alternates the two computations a
//! bounded number of times, using a stable y tick count as the convergence signal:
//! a different set of ticks (`[0,2,4,6,8]` vs `[0,5,10]`) can need a different margin.

use crate::axes::{AxisOptions, Axes, calculate_axes, wrapped_line_count};
use crate::point::DataPoint;
use crate::text::TextMeasurer;
use crate::{LayoutState, Margin};
use scatter_core::Viewport;
use std::f64::consts::FRAC_1_SQRT_2;

pub const MAX_ITERATIONS: usize = 2;
pub const DEFAULT_BOTTOM_MARGIN: f64 = 25.0;

/// Axis line and tick space on the side carrying the y axis
pub const MAIN_Y_AXIS_OFFSET: f64 = 10.0;
/// Space on the opposite side, added only when labels overflow there
pub const SECONDARY_Y_AXIS_OFFSET: f64 = 15.0;
pub const X_AXIS_OFFSET: f64 = 12.0;
/// Room for an axis title
pub const AXIS_TITLE_SPACE: f64 = 20.0;

/// Upper bounds for label-driven margins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginLimits {
    pub left_right: f64,
    pub bottom: f64,
}

impl MarginLimits {
    pub fn for_viewport(viewport: Viewport) -> Self {
        Self {
            left_right: (viewport.width * 0.25).max(0.0),
            bottom: DEFAULT_BOTTOM_MARGIN.max((viewport.height * 0.25).ceil()),
        }
    }
}

/// Pixel space the tick labels need around the plotting area
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickLabelMargins {
    pub x_max: f64,
    pub y_left: f64,
    pub y_right: f64,
}

/// Measure tick labels of `axes` against the current limits
pub fn tick_label_margins(
    axes: &Axes,
    y_on_right: bool,
    limits: MarginLimits,
    measurer: &dyn TextMeasurer,
) -> TickLabelMargins {
    let width = |text: &str, font: f64| measurer.width(text, font);

    let y_main = if axes.y.show {
        axes.y
            .tick_labels()
            .iter()
            .map(|l| width(l, axes.y.font_size))
            .fold(0.0, f64::max)
            .min(limits.left_right)
    } else {
        0.0
    };

    let x = &axes.x;
    let (mut overflow_left, mut overflow_right, mut x_max) = (0.0, 0.0, 0.0);
    if x.show {
        let labels = x.tick_labels();
        let line_height = measurer.height(x.font_size);
        let first = labels.first().map_or(0.0, |l| width(l, x.font_size));
        let last = labels.last().map_or(0.0, |l| width(l, x.font_size));

        if x.will_labels_fit {
            overflow_left = first / 2.0;
            overflow_right = last / 2.0;
            x_max = line_height;
        } else if x.will_labels_word_break {
            let slot = x.label_slot();
            let lines = labels
                .iter()
                .map(|l| wrapped_line_count(l, slot, x.font_size, measurer))
                .max()
                .unwrap_or(1);
            overflow_left = first.min(slot) / 2.0;
            overflow_right = last.min(slot) / 2.0;
            x_max = lines as f64 * line_height;
        } else {
            // Rotated 45°: labels hang down and to the left of their tick
            let widest = labels
                .iter()
                .map(|l| width(l, x.font_size))
                .fold(0.0, f64::max);
            overflow_left = first * FRAC_1_SQRT_2;
            x_max = (widest + line_height) * FRAC_1_SQRT_2;
        }
        overflow_left = overflow_left.min(limits.left_right);
        overflow_right = overflow_right.min(limits.left_right);
        x_max = x_max.min(limits.bottom);
    }

    let (y_left, y_right) = if y_on_right {
        (overflow_left, y_main.max(overflow_right))
    } else {
        (y_main.max(overflow_left), overflow_right)
    };
    TickLabelMargins {
        x_max,
        y_left,
        y_right,
    }
}

/// Margins for the measured tick labels, with axis and title offsets
pub fn margins_from_ticks(tick: TickLabelMargins, axes: &Axes, y_on_right: bool) -> Margin {
    let (main, secondary) = if y_on_right {
        (tick.y_right, tick.y_left)
    } else {
        (tick.y_left, tick.y_right)
    };

    let mut main = main;
    if axes.y.show {
        main += MAIN_Y_AXIS_OFFSET;
    }
    if axes.y.axis_label.is_some() {
        main += AXIS_TITLE_SPACE;
    }
    let secondary = if secondary > 0.0 {
        secondary + SECONDARY_Y_AXIS_OFFSET
    } else {
        0.0
    };

    let mut bottom = tick.x_max;
    if axes.x.show {
        bottom += X_AXIS_OFFSET;
    }
    if axes.x.axis_label.is_some() {
        bottom += AXIS_TITLE_SPACE;
    }

    let (left, right) = if y_on_right {
        (secondary, main)
    } else {
        (main, secondary)
    };
    Margin::new(Margin::initial().top, right, bottom, left).non_negative()
}

// ============================================================================
// LAYOUT LOOP
// ============================================================================

/// Inputs that stay fixed while the loop runs
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    pub points: &'a [DataPoint],
    pub x: AxisOptions<'a>,
    pub y: AxisOptions<'a>,
    pub y_on_right: bool,
    pub measurer: &'a dyn TextMeasurer,
}

impl LayoutContext<'_> {
    fn axes(&self, layout: &LayoutState) -> Axes {
        calculate_axes(self.points, &self.x, &self.y, layout, self.measurer)
    }
}

/// State after one pass of the loop
#[derive(Debug, Clone)]
pub struct LayoutIteration {
    pub layout: LayoutState,
    pub axes: Axes,
    pub tick_label_margins: TickLabelMargins,
    pub converged: bool,
}

impl LayoutIteration {
    /// Starting point: initial inset, axes computed for it
    pub fn initial(ctx: &LayoutContext, viewport: Viewport) -> Self {
        let layout = LayoutState::new(viewport, Margin::initial());
        Self {
            axes: ctx.axes(&layout),
            layout,
            tick_label_margins: TickLabelMargins::default(),
            converged: false,
        }
    }
}

/// One refinement: measure labels, derive margins, recompute the axes
pub fn margin_step(ctx: &LayoutContext, previous: &LayoutIteration) -> LayoutIteration {
    let limits = MarginLimits::for_viewport(previous.layout.viewport);
    let tick = tick_label_margins(&previous.axes, ctx.y_on_right, limits, ctx.measurer);
    let margin = margins_from_ticks(tick, &previous.axes, ctx.y_on_right);
    let layout = previous.layout.with_margin(margin);
    let axes = ctx.axes(&layout);
    let converged = axes.y.values.len() == previous.axes.y.values.len();
    LayoutIteration {
        layout,
        axes,
        tick_label_margins: tick,
        converged,
    }
}

/// Final layout handed to the renderer
#[derive(Debug, Clone)]
pub struct LayoutSolution {
    pub layout: LayoutState,
    pub axes: Axes,
    pub tick_label_margins: TickLabelMargins,
    pub iterations: usize,
    pub converged: bool,
    pub chart_has_axis_labels: bool,
    /// Viewport was shrunk to the backdrop aspect ratio
    pub backdrop_applied: bool,
}

fn run_loop(ctx: &LayoutContext, viewport: Viewport) -> LayoutSolution {
    let mut state = LayoutIteration::initial(ctx, viewport);
    let mut iterations = 0;
    while iterations < MAX_ITERATIONS {
        state = margin_step(ctx, &state);
        iterations += 1;
        if state.converged {
            break;
        }
    }
    LayoutSolution {
        chart_has_axis_labels: state.axes.has_axis_labels(),
        layout: state.layout,
        axes: state.axes,
        tick_label_margins: state.tick_label_margins,
        iterations,
        converged: state.converged,
        backdrop_applied: false,
    }
}

/// Solve margins for `viewport`; with a backdrop image size, shrink the viewport to
/// the image aspect ratio and solve again from the initial inset.
pub fn solve_margins(
    ctx: &LayoutContext,
    viewport: Viewport,
    backdrop: Option<Viewport>,
) -> LayoutSolution {
    let solution = run_loop(ctx, viewport);
    tracing::debug!(
        "Margin solver: {} iterations, converged={}",
        solution.iterations,
        solution.converged
    );

    let Some(image) = backdrop.filter(|image| !image.is_empty()) else {
        return solution;
    };
    let shrunk = fit_backdrop(viewport, solution.layout.viewport_in(), image);
    if shrunk == viewport {
        return solution;
    }

    tracing::debug!(
        "Backdrop {}x{}: viewport {}x{} -> {}x{}",
        image.width,
        image.height,
        viewport.width,
        viewport.height,
        shrunk.width,
        shrunk.height
    );
    LayoutSolution {
        backdrop_applied: true,
        ..run_loop(ctx, shrunk)
    }
}

/// Shrink `viewport` so its plotting area takes the image aspect ratio
pub fn fit_backdrop(viewport: Viewport, viewport_in: Viewport, image: Viewport) -> Viewport {
    if image.is_empty() || viewport_in.is_empty() {
        return viewport;
    }
    if image.width * viewport_in.height < viewport_in.width * image.height {
        let excess = viewport_in.width - viewport_in.height * image.width / image.height;
        Viewport::new((viewport.width - excess).max(0.0), viewport.height)
    } else {
        let excess = viewport_in.height - viewport_in.width * image.height / image.width;
        Viewport::new(viewport.width, (viewport.height - excess).max(0.0))
    }
}
