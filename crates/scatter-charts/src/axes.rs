//! Axis property calculator
//!
//! Both axes are continuous: category and date roles are plotted through numbers
//! (dates as epoch milliseconds). The scale domain is the union of the forced
//! (configured) domain and the data extent.

use crate::chartkit::{LinearScale, Scale};
use crate::margin::MarginLimits;
use crate::point::DataPoint;
use crate::text::TextMeasurer;
use crate::LayoutState;
use scatter_core::{
    AxisSettings, AxisValueFormatter, ColumnSource, DisplayUnit, ValueFormatter, format_date,
};

/// Smallest non-zero magnitude a translate value may take
pub const MIN_TRANSLATE_VALUE: f64 = 1e-25;
/// Largest magnitude a translate value may take
pub const MAX_TRANSLATE_VALUE: f64 = 1e25;

/// Domain used when there is nothing to plot
pub const EMPTY_DOMAIN: (f64, f64) = (0.0, 10.0);

/// Keep a value inside `[MIN_TRANSLATE_VALUE, MAX_TRANSLATE_VALUE]` by magnitude.
///
/// Zero stays zero and the sign is preserved; NaN collapses to zero.
pub fn optimize_translate_value(value: f64) -> f64 {
    if value == 0.0 || value.is_nan() {
        return 0.0;
    }
    value.signum() * value.abs().clamp(MIN_TRANSLATE_VALUE, MAX_TRANSLATE_VALUE)
}

// ============================================================================
// DOMAIN
// ============================================================================

/// Configured axis bounds; either side may be open
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ForcedDomain {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl ForcedDomain {
    pub fn new(start: Option<f64>, end: Option<f64>) -> Self {
        Self { start, end }
    }

    /// Settings bounds, overridden by range hints carried on the data.
    ///
    /// Only the first flattened point's hints are consulted.
    pub fn resolve(settings: &AxisSettings, hint_start: Option<f64>, hint_end: Option<f64>) -> Self {
        Self::new(hint_start.or(settings.start), hint_end.or(settings.end))
    }

    pub fn is_set(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    fn optimized(self) -> Self {
        let clean = |v: Option<f64>| v.filter(|v| !v.is_nan()).map(optimize_translate_value);
        Self::new(clean(self.start), clean(self.end))
    }
}

/// Min/max of finite values, [`EMPTY_DOMAIN`] when there are none
pub fn data_domain(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min <= max { (min, max) } else { EMPTY_DOMAIN }
}

/// Union of the forced bounds with the data extent.
///
/// `start = min(forced.start, actual.min)`, `end = max(forced.end, actual.max)`;
/// a missing forced bound leaves the data bound in place. A zero-width result is
/// widened by one unit each way.
pub fn combine_domain(forced: ForcedDomain, actual: (f64, f64)) -> (f64, f64) {
    let forced = forced.optimized();
    let start = forced.start.map_or(actual.0, |s| s.min(actual.0));
    let end = forced.end.map_or(actual.1, |e| e.max(actual.1));
    if start == end {
        (start - 1.0, end + 1.0)
    } else {
        (start, end)
    }
}

// ============================================================================
// TICK FORMATTING
// ============================================================================

/// Tick label formatter for one axis
#[derive(Debug, Clone, Copy)]
pub enum TickFormatter {
    Number(AxisValueFormatter),
    Date,
}

impl TickFormatter {
    pub fn display_unit(&self) -> DisplayUnit {
        match self {
            Self::Number(f) => f.unit,
            Self::Date => DisplayUnit::None,
        }
    }
}

impl ValueFormatter for TickFormatter {
    fn format(&self, value: f64) -> String {
        match self {
            Self::Number(f) => f.format(value),
            Self::Date => format_date(value),
        }
    }
}

// ============================================================================
// AXIS PROPERTIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    X,
    Y,
}

impl AxisKind {
    /// Tick count suited to the pixel extent of the axis
    pub fn recommended_tick_count(&self, extent: f64) -> usize {
        let (small, medium) = match self {
            Self::X => (300.0, 500.0),
            Self::Y => (150.0, 300.0),
        };
        if extent < small {
            3
        } else if extent < medium {
            5
        } else {
            8
        }
    }
}

/// Everything the calculator needs to know about one axis besides the data
#[derive(Debug, Clone, Copy)]
pub struct AxisOptions<'a> {
    pub settings: &'a AxisSettings,
    pub source: Option<&'a ColumnSource>,
    pub forced: ForcedDomain,
}

impl<'a> AxisOptions<'a> {
    pub fn new(settings: &'a AxisSettings, source: Option<&'a ColumnSource>) -> Self {
        Self {
            settings,
            source,
            forced: ForcedDomain::new(settings.start, settings.end),
        }
    }

    pub fn with_forced(mut self, forced: ForcedDomain) -> Self {
        self.forced = forced;
        self
    }

    fn is_date(&self) -> bool {
        self.source.is_some_and(|s| s.value_type.is_date())
    }
}

/// Resolved axis: scale, ticks, title and label layout strategy
#[derive(Debug, Clone)]
pub struct AxisProperties {
    pub kind: AxisKind,
    pub scale: LinearScale,
    pub values: Vec<f64>,
    pub axis_label: Option<String>,
    pub formatter: TickFormatter,
    pub show: bool,
    pub font_size: f64,
    pub will_labels_fit: bool,
    pub will_labels_word_break: bool,
}

impl AxisProperties {
    pub fn tick_labels(&self) -> Vec<String> {
        self.values.iter().map(|v| self.formatter.format(*v)).collect()
    }

    /// Pixel space available to each tick label along the axis
    pub fn label_slot(&self) -> f64 {
        self.scale.range_extent() / self.values.len().max(1) as f64
    }

    fn build(
        kind: AxisKind,
        options: &AxisOptions,
        actual: (f64, f64),
        extent: f64,
        measurer: &dyn TextMeasurer,
        limits: MarginLimits,
    ) -> Self {
        let tick_count = kind.recommended_tick_count(extent);
        let (start, end) = combine_domain(options.forced, actual);
        let mut scale = LinearScale::new().domain(start, end);
        // Configured bounds are shown as given
        if !options.forced.is_set() {
            scale = scale.nice(tick_count);
        }
        scale = match kind {
            AxisKind::X => scale.range(0.0, extent),
            AxisKind::Y => scale.range(extent, 0.0),
        };
        let values = scale.ticks(tick_count);

        let formatter = if options.is_date() {
            TickFormatter::Date
        } else {
            let (d0, d1) = scale.domain_bounds();
            let unit = options.settings.display_units.resolve(d0.abs().max(d1.abs()));
            TickFormatter::Number(AxisValueFormatter::new(unit, options.settings.precision))
        };

        let mut axis = Self {
            kind,
            scale,
            values,
            axis_label: axis_title(options, formatter.display_unit()),
            formatter,
            show: options.settings.show,
            font_size: options.settings.font_size,
            will_labels_fit: true,
            will_labels_word_break: false,
        };
        if kind == AxisKind::X {
            axis.will_labels_fit = axis.labels_fit(measurer);
            axis.will_labels_word_break =
                !axis.will_labels_fit && axis.labels_word_break(measurer, limits.bottom);
        }
        axis
    }

    fn labels_fit(&self, measurer: &dyn TextMeasurer) -> bool {
        let slot = self.label_slot();
        self.tick_labels()
            .iter()
            .all(|label| measurer.width(label, self.font_size) <= slot)
    }

    /// Wrapping helps only if every word fits its slot and the tallest label
    /// stays within the bottom limit
    fn labels_word_break(&self, measurer: &dyn TextMeasurer, bottom_limit: f64) -> bool {
        let slot = self.label_slot();
        let line_height = measurer.height(self.font_size);
        self.tick_labels().iter().all(|label| {
            let words_fit = label
                .split_whitespace()
                .all(|word| measurer.width(word, self.font_size) <= slot);
            words_fit
                && wrapped_line_count(label, slot, self.font_size, measurer) as f64 * line_height
                    <= bottom_limit
        })
    }
}

/// Greedy word wrap into lines no wider than `max_width` (long words stay whole)
pub fn wrap_words(
    text: &str,
    max_width: f64,
    font_size: f64,
    measurer: &dyn TextMeasurer,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
            continue;
        }
        let candidate = format!("{current} {word}");
        if measurer.width(&candidate, font_size) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Number of lines [`wrap_words`] produces, at least one
pub fn wrapped_line_count(
    text: &str,
    max_width: f64,
    font_size: f64,
    measurer: &dyn TextMeasurer,
) -> usize {
    wrap_words(text, max_width, font_size, measurer).len().max(1)
}

/// Column title with the display unit appended, after visibility settings
fn axis_title(options: &AxisOptions, unit: DisplayUnit) -> Option<String> {
    if !options.settings.show || !options.settings.show_title {
        return None;
    }
    let title = options
        .settings
        .title
        .clone()
        .filter(|t| !t.is_empty())
        .or_else(|| options.source.map(|s| s.display_name.clone()))?;
    Some(match unit.title() {
        Some(unit) => format!("{title} ({unit})"),
        None => title,
    })
}

// ============================================================================
// CALCULATOR
// ============================================================================

#[derive(Debug, Clone)]
pub struct Axes {
    pub x: AxisProperties,
    pub y: AxisProperties,
}

impl Axes {
    /// At least one axis title survived visibility settings
    pub fn has_axis_labels(&self) -> bool {
        self.x.axis_label.is_some() || self.y.axis_label.is_some()
    }
}

/// Compute both axes for the plotting area of `layout`.
///
/// No data points yields `[0, 10]` on both axes.
pub fn calculate_axes(
    points: &[DataPoint],
    x: &AxisOptions,
    y: &AxisOptions,
    layout: &LayoutState,
    measurer: &dyn TextMeasurer,
) -> Axes {
    let inner = layout.viewport_in();
    let limits = MarginLimits::for_viewport(layout.viewport);
    let x_actual = data_domain(points.iter().map(|p| p.x));
    let y_actual = data_domain(points.iter().map(|p| p.y));

    Axes {
        x: AxisProperties::build(AxisKind::X, x, x_actual, inner.width, measurer, limits),
        y: AxisProperties::build(AxisKind::Y, y, y_actual, inner.height, measurer, limits),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Identity;
    use crate::text::ApproxTextMeasurer;
    use crate::Margin;
    use proptest::prelude::*;
    use scatter_core::{Role, ValueType, Viewport};

    fn points(xy: &[(f64, f64)]) -> Vec<DataPoint> {
        xy.iter()
            .enumerate()
            .map(|(i, (x, y))| DataPoint::new(*x, *y, Identity::new(i, 0, &i.to_string(), "")))
            .collect()
    }

    fn layout(width: f64, height: f64) -> LayoutState {
        LayoutState::new(Viewport::new(width, height), Margin::initial())
    }

    #[test]
    fn test_translate_clamp() {
        assert_eq!(optimize_translate_value(0.0), 0.0);
        assert_eq!(optimize_translate_value(1e30), 1e25);
        assert_eq!(optimize_translate_value(-1e30), -1e25);
        assert_eq!(optimize_translate_value(1e-30), 1e-25);
        assert_eq!(optimize_translate_value(-1e-30), -1e-25);
        assert_eq!(optimize_translate_value(42.0), 42.0);
        assert_eq!(optimize_translate_value(f64::NEG_INFINITY), -1e25);
    }

    #[test]
    fn test_forced_domain_union() {
        let forced = ForcedDomain::new(Some(500.0), Some(700.0));
        assert_eq!(combine_domain(forced, (100.0, 900.0)), (100.0, 900.0));

        let wider = ForcedDomain::new(Some(0.0), Some(1000.0));
        assert_eq!(combine_domain(wider, (100.0, 900.0)), (0.0, 1000.0));

        let start_only = ForcedDomain::new(Some(-50.0), None);
        assert_eq!(combine_domain(start_only, (100.0, 900.0)), (-50.0, 900.0));

        let huge = ForcedDomain::new(None, Some(1e40));
        assert_eq!(combine_domain(huge, (1.0, 2.0)), (1.0, 1e25));
    }

    #[test]
    fn test_zero_width_domain_widens() {
        assert_eq!(combine_domain(ForcedDomain::default(), (5.0, 5.0)), (4.0, 6.0));
    }

    #[test]
    fn test_first_point_hints_override_settings() {
        let settings = AxisSettings {
            start: Some(10.0),
            end: Some(20.0),
            ..AxisSettings::default()
        };
        let forced = ForcedDomain::resolve(&settings, Some(0.0), None);
        assert_eq!(forced, ForcedDomain::new(Some(0.0), Some(20.0)));
    }

    #[test]
    fn test_empty_points_default_domain() {
        let settings = AxisSettings::default();
        let options = AxisOptions::new(&settings, None);
        let axes = calculate_axes(&[], &options, &options, &layout(400.0, 300.0), &ApproxTextMeasurer);
        assert_eq!(axes.x.scale.domain_bounds(), (0.0, 10.0));
        assert_eq!(axes.y.scale.domain_bounds(), (0.0, 10.0));
        assert!(!axes.has_axis_labels());
    }

    #[test]
    fn test_scales_map_into_plot_area() {
        let settings = AxisSettings::default();
        let options = AxisOptions::new(&settings, None);
        let layout = layout(600.0, 400.0);
        let axes = calculate_axes(
            &points(&[(100.0, 200.0), (500.0, 400.0), (900.0, 600.0)]),
            &options,
            &options,
            &layout,
            &ApproxTextMeasurer,
        );
        let inner = layout.viewport_in();
        let (x0, x1) = axes.x.scale.domain_bounds();
        assert!(x0 <= 100.0 && x1 >= 900.0);
        assert_eq!(axes.x.scale.range_bounds(), (0.0, inner.width));
        // y grows upwards
        assert_eq!(axes.y.scale.range_bounds(), (inner.height, 0.0));
        assert!(axes.y.values.len() >= 2);
    }

    #[test]
    fn test_forced_domain_is_not_niced() {
        let settings = AxisSettings {
            start: Some(500.0),
            end: Some(700.0),
            ..AxisSettings::default()
        };
        let x = AxisOptions::new(&settings, None);
        let default = AxisSettings::default();
        let y = AxisOptions::new(&default, None);
        let axes = calculate_axes(
            &points(&[(103.0, 1.0), (897.0, 2.0)]),
            &x,
            &y,
            &layout(600.0, 400.0),
            &ApproxTextMeasurer,
        );
        assert_eq!(axes.x.scale.domain_bounds(), (103.0, 897.0));
    }

    #[test]
    fn test_title_with_display_units() {
        let source = ColumnSource::new("Sales", Role::X);
        let settings = AxisSettings::default();
        let options = AxisOptions::new(&settings, Some(&source));
        let axes = calculate_axes(
            &points(&[(1_000.0, 1.0), (90_000.0, 2.0)]),
            &options,
            &AxisOptions::new(&settings, None),
            &layout(600.0, 400.0),
            &ApproxTextMeasurer,
        );
        assert_eq!(axes.x.axis_label.as_deref(), Some("Sales (Thousands)"));
        assert!(axes.x.tick_labels().iter().all(|l| l.ends_with('K')));

        let hidden = AxisSettings {
            show_title: false,
            ..AxisSettings::default()
        };
        let options = AxisOptions::new(&hidden, Some(&source));
        let axes = calculate_axes(&[], &options, &options, &layout(600.0, 400.0), &ApproxTextMeasurer);
        assert!(axes.x.axis_label.is_none());
    }

    #[test]
    fn test_date_axis_formats_dates() {
        let source = ColumnSource::new("Day", Role::X).with_type(ValueType::Date);
        let settings = AxisSettings::default();
        let options = AxisOptions::new(&settings, Some(&source));
        let day = 86_400_000.0;
        let axes = calculate_axes(
            &points(&[(0.0, 1.0), (20.0 * day, 2.0)]),
            &options,
            &AxisOptions::new(&settings, None),
            &layout(600.0, 400.0),
            &ApproxTextMeasurer,
        );
        assert_eq!(axes.x.tick_labels()[0], "01/01/1970");
        assert_eq!(axes.x.axis_label.as_deref(), Some("Day"));
    }

    #[test]
    fn test_narrow_axis_labels_do_not_fit() {
        let settings = AxisSettings::default();
        let options = AxisOptions::new(&settings, None);
        let axes = calculate_axes(
            &points(&[(123_456.0, 1.0), (987_654.0, 2.0)]),
            &AxisOptions {
                settings: &AxisSettings {
                    display_units: DisplayUnit::None,
                    ..AxisSettings::default()
                },
                source: None,
                forced: ForcedDomain::default(),
            },
            &options,
            &layout(60.0, 400.0),
            &ApproxTextMeasurer,
        );
        assert!(!axes.x.will_labels_fit);
        // single-word labels cannot be helped by wrapping
        assert!(!axes.x.will_labels_word_break);
        assert!(axes.y.will_labels_fit);
    }

    #[test]
    fn test_wrapped_line_count() {
        let m = ApproxTextMeasurer;
        assert_eq!(wrapped_line_count("", 100.0, 10.0, &m), 1);
        assert_eq!(wrapped_line_count("North", 100.0, 10.0, &m), 1);
        let one_word = m.width("North", 10.0);
        assert_eq!(wrapped_line_count("North South East", one_word + 1.0, 10.0, &m), 3);
        assert_eq!(
            wrap_words("North South", 1000.0, 10.0, &m),
            vec!["North South".to_string()]
        );
    }

    proptest! {
        #[test]
        fn prop_translate_clamp_bounds(v in proptest::num::f64::ANY) {
            let out = optimize_translate_value(v);
            prop_assert!(out.abs() <= MAX_TRANSLATE_VALUE);
            if v != 0.0 && !v.is_nan() {
                prop_assert!(out.abs() >= MIN_TRANSLATE_VALUE);
                prop_assert_eq!(out.signum(), v.signum());
            }
        }
    }
}
