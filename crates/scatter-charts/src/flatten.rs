//! Row flattener: data view → plot-ready data points
//!
//! Walks categories × series groups. A row becomes a point only when both x and y
//! resolve to numbers; partial points are never emitted.

use crate::point::{DataPoint, FormattedCategory, Identity, SizeMeasure, TooltipItem};
use crate::shapes::{Shape, resolve_shape};
use crate::size::SizeRange;
use scatter_core::colors::darken;
use scatter_core::{
    CategoryColumn, ColorResolver, ColumnSource, DataView, PrimitiveValue, Result, Role,
    ScatterError, ValueColumn, ValueGroup, VisualSettings, format_primitive,
};

/// How much darker the outline is than the fill
const OUTLINE_DARKEN: f64 = 0.3;

// ============================================================================
// ROLE RESOLUTION
// ============================================================================

/// Measure columns of one series group, looked up once by role
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleColumns<'a> {
    pub x: Option<&'a ValueColumn>,
    pub y: Option<&'a ValueColumn>,
    pub size: Option<&'a ValueColumn>,
    pub shape: Option<&'a ValueColumn>,
    pub rotation: Option<&'a ValueColumn>,
    pub x_start: Option<&'a ValueColumn>,
    pub x_end: Option<&'a ValueColumn>,
    pub y_start: Option<&'a ValueColumn>,
    pub y_end: Option<&'a ValueColumn>,
}

impl<'a> RoleColumns<'a> {
    pub fn resolve(group: &'a ValueGroup) -> Self {
        Self {
            x: group.column(Role::X),
            y: group.column(Role::Y),
            size: group.column(Role::Size),
            shape: group.column(Role::Shape),
            rotation: group.column(Role::Rotation),
            x_start: group.column(Role::XStart),
            x_end: group.column(Role::XEnd),
            y_start: group.column(Role::YStart),
            y_end: group.column(Role::YEnd),
        }
    }
}

/// Category-level columns
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryRoles<'a> {
    pub category: Option<&'a CategoryColumn>,
    pub color_fill: Option<&'a CategoryColumn>,
    pub image: Option<&'a CategoryColumn>,
    pub backdrop: Option<&'a CategoryColumn>,
}

impl<'a> CategoryRoles<'a> {
    pub fn resolve(view: &'a DataView) -> Self {
        Self {
            category: view.category(Role::Category),
            color_fill: view.category(Role::ColorFill),
            image: view.category(Role::Image),
            backdrop: view.category(Role::Backdrop),
        }
    }
}

/// Sources of the x and y measures; both roles must be bound to plot anything
pub fn resolve_axis_sources(view: &DataView) -> Result<(ColumnSource, ColumnSource)> {
    let source = |role| {
        view.groups
            .iter()
            .find_map(|g| g.column(role))
            .map(|c| c.source.clone())
            .ok_or(ScatterError::MissingRole(role))
    };
    Ok((source(Role::X)?, source(Role::Y)?))
}

pub(crate) fn series_key(group: &ValueGroup) -> String {
    group
        .name
        .as_ref()
        .map(PrimitiveValue::to_key)
        .unwrap_or_default()
}

// ============================================================================
// FLATTEN
// ============================================================================

/// Flattened points plus the metadata the layout and renderer need
#[derive(Debug, Clone, Default)]
pub struct FlattenResult {
    pub data_points: Vec<DataPoint>,
    pub size_range: Option<SizeRange>,
    pub x_source: Option<ColumnSource>,
    pub y_source: Option<ColumnSource>,
    pub has_dynamic_series: bool,
    pub has_highlights: bool,
    pub has_size: bool,
    pub use_shape: bool,
    pub use_custom_color: bool,
    pub dropped_rows: usize,
}

/// Convert the host data view into data points.
///
/// A view without bound x or y roles yields an empty result.
pub fn flatten(
    view: &DataView,
    settings: &VisualSettings,
    colors: &mut dyn ColorResolver,
) -> FlattenResult {
    let (x_source, y_source) = match resolve_axis_sources(view) {
        Ok(sources) => sources,
        Err(e) => {
            tracing::warn!("No data points: {}", e);
            return FlattenResult::default();
        }
    };

    let categories = CategoryRoles::resolve(view);
    let groups: Vec<(&ValueGroup, RoleColumns)> = view
        .groups
        .iter()
        .map(|g| (g, RoleColumns::resolve(g)))
        .collect();

    let has_dynamic_series = view.has_dynamic_series();
    let has_highlights = view.has_highlights();
    let size_range = SizeRange::from_values(groups.iter().flat_map(|(_, roles)| {
        roles
            .size
            .into_iter()
            .flat_map(|c| (0..c.values.len()).filter_map(move |i| c.number(i)))
    }));

    let mut result = FlattenResult {
        size_range,
        has_dynamic_series,
        has_highlights,
        has_size: view.has_role(Role::Size),
        use_shape: view.has_role(Role::Shape),
        use_custom_color: categories.color_fill.is_some(),
        ..FlattenResult::default()
    };

    for row in 0..view.row_count() {
        let category_value = categories.category.and_then(|c| c.value(row));
        let category_key = category_value.map(PrimitiveValue::to_key).unwrap_or_default();
        // Several highlighted series at one category collapse into one flag
        let highlight = has_highlights
            && view
                .groups
                .iter()
                .flat_map(|g| g.columns.iter())
                .any(|c| c.highlight(row).is_some());

        for (series_index, (group, roles)) in groups.iter().enumerate() {
            let (Some(x_col), Some(y_col)) = (roles.x, roles.y) else {
                continue;
            };
            let finite = |c: &ValueColumn| c.number(row).filter(|v| v.is_finite());
            let (Some(x), Some(y)) = (finite(x_col), finite(y_col)) else {
                result.dropped_rows += 1;
                continue;
            };

            let series = series_key(group);
            let color = if has_dynamic_series {
                colors.series_color(&series)
            } else {
                colors.measure_color(&y_col.source.query_name)
            };
            let color_fill = text_at(categories.color_fill, row).unwrap_or(color);

            let size = roles.size.map(|c| SizeMeasure {
                value: c.number(row),
                series_index,
                row_index: row,
            });
            let fill = (settings.data_point.fill_point || size.is_some())
                .then(|| color_fill.clone());
            let stroke = if settings.data_point.outline {
                darken(&color_fill, OUTLINE_DARKEN)
            } else {
                color_fill.clone()
            };

            let shape = roles
                .shape
                .map(|c| resolve_shape(c.value(row)))
                .unwrap_or(Shape::Circle);
            let rotation = roles
                .rotation
                .and_then(|c| c.number(row))
                .filter(|r| r.is_finite())
                .unwrap_or(0.0);

            result.data_points.push(DataPoint {
                x,
                y,
                size,
                color_fill,
                fill,
                stroke,
                stroke_width: settings.data_point.stroke_width.max(0.0),
                shape,
                image: text_at(categories.image, row),
                rotation,
                backdrop: text_at(categories.backdrop, row),
                x_start: roles.x_start.and_then(|c| c.number(row)),
                x_end: roles.x_end.and_then(|c| c.number(row)),
                y_start: roles.y_start.and_then(|c| c.number(row)),
                y_end: roles.y_end.and_then(|c| c.number(row)),
                identity: Identity::new(row, series_index, &category_key, &series),
                formatted_category: FormattedCategory::new(
                    category_value.cloned(),
                    categories
                        .category
                        .map(|c| c.source.value_type)
                        .unwrap_or_default(),
                ),
                selected: false,
                highlight,
                tooltip_info: tooltip_info(view, &categories, group, roles, row),
            });
        }
    }

    if result.dropped_rows > 0 {
        tracing::debug!("Dropped {} rows without x or y", result.dropped_rows);
    }
    tracing::debug!("Flattened {} data points", result.data_points.len());

    result.x_source = Some(x_source);
    result.y_source = Some(y_source);
    result
}

/// Non-empty string form of a category cell (colours, URLs)
fn text_at(column: Option<&CategoryColumn>, row: usize) -> Option<String> {
    column
        .and_then(|c| c.value(row))
        .map(PrimitiveValue::to_key)
        .filter(|s| !s.is_empty())
}

/// Tooltip rows in fixed role order; absent roles are skipped
fn tooltip_info(
    view: &DataView,
    categories: &CategoryRoles,
    group: &ValueGroup,
    roles: &RoleColumns,
    row: usize,
) -> Vec<TooltipItem> {
    let mut items = Vec::new();
    let mut push = |source: &ColumnSource, value: Option<&PrimitiveValue>| {
        if let Some(value) = value {
            items.push(TooltipItem::new(
                source.display_name.clone(),
                format_primitive(value, source.value_type),
            ));
        }
    };
    fn category<'a>(
        c: Option<&'a CategoryColumn>,
        row: usize,
    ) -> Option<(&'a ColumnSource, Option<&'a PrimitiveValue>)> {
        c.map(|c| (&c.source, c.value(row)))
    }
    fn measure<'a>(
        c: Option<&'a ValueColumn>,
        row: usize,
    ) -> Option<(&'a ColumnSource, Option<&'a PrimitiveValue>)> {
        c.map(|c| (&c.source, c.value(row)))
    }

    let series = view.series.as_ref().map(|s| (s, group.name.as_ref()));
    let ordered = [
        category(categories.category, row),
        series,
        measure(roles.x, row),
        measure(roles.y, row),
        measure(roles.size, row),
        category(categories.color_fill, row),
        measure(roles.shape, row),
        category(categories.image, row),
        measure(roles.rotation, row),
        category(categories.backdrop, row),
        measure(roles.x_start, row),
        measure(roles.x_end, row),
        measure(roles.y_start, row),
        measure(roles.y_end, row),
    ];
    for (source, value) in ordered.into_iter().flatten() {
        push(source, value);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use scatter_core::{PaletteColorResolver, ValueType};

    fn measure(name: &str, role: Role, values: &[Option<f64>]) -> ValueColumn {
        ValueColumn::new(
            ColumnSource::new(name, role),
            values.iter().map(|v| v.map(PrimitiveValue::from)).collect(),
        )
    }

    fn category(name: &str, role: Role, values: &[&str]) -> CategoryColumn {
        CategoryColumn::new(
            ColumnSource::new(name, role).with_type(ValueType::Text),
            values.iter().map(|v| Some(PrimitiveValue::from(*v))).collect(),
        )
    }

    fn view(columns: Vec<ValueColumn>) -> DataView {
        DataView {
            categories: vec![category("City", Role::Category, &["A", "B", "C"])],
            groups: vec![ValueGroup::new(None, columns)],
            series: None,
        }
    }

    fn run(view: &DataView) -> FlattenResult {
        flatten(view, &VisualSettings::default(), &mut PaletteColorResolver::new())
    }

    #[test]
    fn test_rows_missing_x_or_y_are_dropped() {
        let view = view(vec![
            measure("Sales", Role::X, &[Some(100.0), None, Some(900.0)]),
            measure("Profit", Role::Y, &[Some(200.0), Some(500.0), Some(f64::NAN)]),
        ]);
        let result = run(&view);
        assert_eq!(result.data_points.len(), 1);
        assert_eq!(result.dropped_rows, 2);
        assert_eq!(result.data_points[0].formatted_category.get(), "A");
    }

    #[test]
    fn test_missing_y_role_is_empty() {
        let view = view(vec![measure("Sales", Role::X, &[Some(1.0), Some(2.0), Some(3.0)])]);
        let result = run(&view);
        assert!(result.data_points.is_empty());
        assert!(result.x_source.is_none());
    }

    #[test]
    fn test_tooltip_order_skips_absent_roles() {
        let view = view(vec![
            measure("Sales", Role::X, &[Some(1.0), Some(2.0), Some(3.0)]),
            measure("Profit", Role::Y, &[Some(4.0), Some(5.0), Some(6.0)]),
            measure("Units", Role::Size, &[Some(7.0), None, Some(9.0)]),
        ]);
        let result = run(&view);
        let names = |i: usize| -> Vec<String> {
            result.data_points[i]
                .tooltip_info
                .iter()
                .map(|t| t.display_name.clone())
                .collect()
        };
        assert_eq!(names(0), ["City", "Sales", "Profit", "Units"]);
        assert_eq!(names(1), ["City", "Sales", "Profit"]);
        assert_eq!(result.data_points[0].tooltip_info[3].value, "7");
    }

    #[test]
    fn test_fill_requires_size_or_fill_point() {
        let plain = view(vec![
            measure("Sales", Role::X, &[Some(1.0), Some(2.0), Some(3.0)]),
            measure("Profit", Role::Y, &[Some(4.0), Some(5.0), Some(6.0)]),
        ]);
        assert!(run(&plain).data_points.iter().all(|p| p.fill.is_none()));

        let mut settings = VisualSettings::default();
        settings.data_point.fill_point = true;
        settings.data_point.outline = true;
        let result = flatten(&plain, &settings, &mut PaletteColorResolver::new());
        let point = &result.data_points[0];
        assert_eq!(point.fill.as_deref(), Some(point.color_fill.as_str()));
        assert_ne!(point.stroke, point.color_fill);
    }

    #[test]
    fn test_dynamic_series_colors_and_identity() {
        let mut view = view(vec![]);
        view.series = Some(ColumnSource::new("Year", Role::Series));
        view.groups = ["2023", "2024"]
            .iter()
            .map(|year| {
                ValueGroup::new(
                    Some((*year).into()),
                    vec![
                        measure("Sales", Role::X, &[Some(1.0), Some(2.0), Some(3.0)]),
                        measure("Profit", Role::Y, &[Some(4.0), Some(5.0), Some(6.0)]),
                    ],
                )
            })
            .collect();

        let result = run(&view);
        assert_eq!(result.data_points.len(), 6);
        assert!(result.has_dynamic_series);
        let first = &result.data_points[0];
        let second = &result.data_points[1];
        assert_ne!(first.color_fill, second.color_fill);
        assert_ne!(first.identity, second.identity);
        assert_eq!(first.tooltip_info[1], TooltipItem::new("Year", "2023"));
    }

    #[test]
    fn test_color_fill_shape_and_rotation_roles() {
        let mut view = view(vec![
            measure("Sales", Role::X, &[Some(1.0), Some(2.0), Some(3.0)]),
            measure("Profit", Role::Y, &[Some(4.0), Some(5.0), Some(6.0)]),
            measure("Kind", Role::Shape, &[Some(6.0), Some(99.0), None]),
            measure("Angle", Role::Rotation, &[Some(45.0), None, Some(f64::INFINITY)]),
        ]);
        view.categories
            .push(category("Paint", Role::ColorFill, &["#ff0000", "", "#00ff00"]));

        let result = run(&view);
        assert!(result.use_shape && result.use_custom_color);
        let points = &result.data_points;
        assert_eq!(points[0].color_fill, "#ff0000");
        assert_eq!(points[0].shape, Shape::Star);
        assert_eq!(points[1].shape, Shape::Circle);
        assert_eq!(points[0].rotation, 45.0);
        assert_eq!(points[2].rotation, 0.0);
        assert_ne!(points[1].color_fill, "");
    }

    #[test]
    fn test_malformed_color_fill_with_outline() {
        let mut view = view(vec![
            measure("Sales", Role::X, &[Some(1.0), Some(2.0), Some(3.0)]),
            measure("Profit", Role::Y, &[Some(4.0), Some(5.0), Some(6.0)]),
        ]);
        view.categories
            .push(category("Paint", Role::ColorFill, &["#a€bc", "#a€bc", "#a€bc"]));
        let mut settings = VisualSettings::default();
        settings.data_point.outline = true;

        let result = flatten(&view, &settings, &mut PaletteColorResolver::new());
        assert_eq!(result.data_points.len(), 3);
        assert_eq!(result.data_points[0].color_fill, "#a€bc");
        assert_eq!(result.data_points[0].stroke, "#a€bc");
    }

    #[test]
    fn test_highlight_is_per_category() {
        let y = measure("Profit", Role::Y, &[Some(4.0), Some(5.0), Some(6.0)])
            .with_highlights(vec![None, Some(5.0.into()), None]);
        let view = view(vec![measure("Sales", Role::X, &[Some(1.0), Some(2.0), Some(3.0)]), y]);
        let result = run(&view);
        assert!(result.has_highlights);
        let flags: Vec<bool> = result.data_points.iter().map(|p| p.highlight).collect();
        assert_eq!(flags, [false, true, false]);
    }

    #[test]
    fn test_size_range_spans_all_groups() {
        let view = view(vec![
            measure("Sales", Role::X, &[Some(1.0), Some(2.0), Some(3.0)]),
            measure("Profit", Role::Y, &[Some(4.0), Some(5.0), Some(6.0)]),
            measure("Units", Role::Size, &[Some(10.0), Some(15.0), Some(20.0)]),
        ]);
        let result = run(&view);
        assert_eq!(result.size_range, Some(SizeRange::new(10.0, 20.0)));
        assert_eq!(result.data_points[2].size_value(), Some(20.0));
        assert!(result.data_points.iter().all(|p| p.fill.is_some()));
    }
}
