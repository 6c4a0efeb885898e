//! End-to-end runs of the visual update over JSON data views

use proptest::prelude::*;
use scatter_charts::{
    Crosshair, DEFAULT_BUBBLE_RADIUS, ScatterVisual, correct_pointer, map_pointer,
};
use scatter_core::{
    CategoryColumn, ColumnSource, DataView, PrimitiveValue, Role, ScatterError, ValueColumn,
    ValueGroup, Viewport, VisualSettings,
};

const CITIES: &str = r#"{
    "categories": [
        { "source": { "display_name": "City", "roles": ["Category"], "value_type": "text" },
          "values": ["Oslo", "Bergen", "Trondheim"] }
    ],
    "groups": [
        { "columns": [
            { "source": { "display_name": "Sales", "roles": ["X"] }, "values": [100, 500, 900] },
            { "source": { "display_name": "Profit", "roles": ["Y"] }, "values": [200, 400, 600] }
        ] }
    ]
}"#;

fn viewport() -> Viewport {
    Viewport::new(600.0, 400.0)
}

fn cities() -> DataView {
    DataView::from_json(CITIES).expect("fixture parses")
}

fn measure(name: &str, role: Role, values: Vec<Option<f64>>) -> ValueColumn {
    ValueColumn::new(
        ColumnSource::new(name, role),
        values.into_iter().map(|v| v.map(PrimitiveValue::from)).collect(),
    )
}

fn view_of(x: Vec<Option<f64>>, y: Vec<Option<f64>>) -> DataView {
    let rows = x.len().max(y.len());
    DataView {
        categories: vec![CategoryColumn::new(
            ColumnSource::new("Row", Role::Category),
            (0..rows).map(|i| Some(PrimitiveValue::from(i as f64))).collect(),
        )],
        groups: vec![ValueGroup::new(
            None,
            vec![measure("X", Role::X, x), measure("Y", Role::Y, y)],
        )],
        series: None,
    }
}

#[test]
fn test_three_points_use_default_radius() {
    let frame = ScatterVisual::new().update(&cities(), &VisualSettings::default(), viewport(), None);
    assert_eq!(frame.points.len(), 3);

    let markers = frame.markers();
    assert_eq!(markers.len(), 3);
    assert!(markers.iter().all(|m| m.radius == DEFAULT_BUBBLE_RADIUS));
}

#[test]
fn test_largest_bubble_is_drawn_first() {
    let mut view = cities();
    view.groups[0].columns.push(measure(
        "Units",
        Role::Size,
        vec![Some(10.0), Some(15.0), Some(20.0)],
    ));
    let frame = ScatterVisual::new().update(&view, &VisualSettings::default(), viewport(), None);
    let markers = frame.markers();

    assert_eq!(markers[0].key, frame.points[2].identity.key);
    let max_radius = markers.iter().map(|m| m.radius).fold(f64::MIN, f64::max);
    assert_eq!(markers[0].radius, max_radius);
    assert!(markers[0].radius > markers[2].radius);
}

#[test]
fn test_row_without_x_is_dropped() {
    let view = view_of(
        vec![Some(1.0), None, Some(3.0)],
        vec![Some(10.0), Some(500.0), Some(30.0)],
    );
    let frame = ScatterVisual::new().update(&view, &VisualSettings::default(), viewport(), None);
    assert_eq!(frame.points.len(), 2);
    assert!(frame.points.iter().all(|p| p.y != 500.0));
}

#[test]
fn test_forced_domain_is_unioned_with_data() {
    let mut settings = VisualSettings::default();
    settings.category_axis.start = Some(500.0);
    settings.category_axis.end = Some(700.0);

    let frame = ScatterVisual::new().update(&cities(), &settings, viewport(), None);
    let (min, max) = frame.solution.axes.x.scale.domain_bounds();
    assert_eq!((min, max), (100.0, 900.0));
}

#[test]
fn test_subnormal_extent_renders_without_panicking() {
    let view = view_of(vec![Some(0.0), Some(1e-310)], vec![Some(1.0), Some(2.0)]);

    let frame = ScatterVisual::new().update(&view, &VisualSettings::default(), viewport(), None);
    assert!(frame.solution.axes.x.values.is_empty());
    assert_eq!(frame.markers().len(), 2);

    // forced bounds are clamped away from the subnormal range first
    let mut settings = VisualSettings::default();
    settings.category_axis.start = Some(0.0);
    settings.category_axis.end = Some(1e-310);
    let frame = ScatterVisual::new().update(&view, &settings, viewport(), None);
    assert!(frame.markers().iter().all(|m| m.cx.is_finite()));
}

#[test]
fn test_scaled_pointer_maps_through_frame() {
    assert_eq!(
        correct_pointer((50.0, 50.0), Viewport::new(400.0, 400.0), Viewport::new(200.0, 200.0)),
        (25.0, 25.0)
    );

    let frame = ScatterVisual::new().update(&cities(), &VisualSettings::default(), viewport(), None);
    let layout = frame.layout();
    let rendered = Viewport::new(viewport().width * 2.0, viewport().height * 2.0);
    let raw = (
        (layout.margin.left + 10.0) * 2.0,
        (layout.margin.top + 20.0) * 2.0,
    );
    let readout = map_pointer(
        raw,
        rendered,
        layout.viewport,
        layout,
        &frame.solution.axes.x.scale,
        &frame.solution.axes.y.scale,
    );
    assert!((readout.pixel_x - 10.0).abs() < 1e-9);
    assert!((readout.pixel_y - 20.0).abs() < 1e-9);

    let mut crosshair = Crosshair::default();
    crosshair.update(readout);
    assert_eq!(crosshair.shown(), Some(readout));
}

#[test]
fn test_missing_y_role_is_reported() {
    let json = r#"{ "groups": [ { "columns": [
        { "source": { "display_name": "Sales", "roles": ["X"] }, "values": [1] }
    ] } ] }"#;
    let view = DataView::from_json(json).expect("fixture parses");
    let err = scatter_charts::resolve_axis_sources(&view).unwrap_err();
    assert!(matches!(err, ScatterError::MissingRole(Role::Y)));

    let frame = ScatterVisual::new().update(&view, &VisualSettings::default(), viewport(), None);
    assert!(frame.points.is_empty());
    assert!(frame.markers().is_empty());
}

fn cell() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None),
        1 => Just(Some(f64::NAN)),
        6 => (-1e6f64..1e6).prop_map(Some),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_points_require_both_coordinates(rows in prop::collection::vec((cell(), cell()), 0..24)) {
        let (x, y): (Vec<_>, Vec<_>) = rows.iter().cloned().unzip();
        let expected = rows
            .iter()
            .filter(|(x, y)| x.is_some_and(f64::is_finite) && y.is_some_and(f64::is_finite))
            .count();

        let frame = ScatterVisual::new().update(&view_of(x, y), &VisualSettings::default(), viewport(), None);
        prop_assert_eq!(frame.points.len(), expected);
    }

    #[test]
    fn prop_layout_margins_stay_non_negative(
        width in 0.0f64..2000.0,
        height in 0.0f64..2000.0,
        rows in prop::collection::vec((cell(), cell()), 0..12),
    ) {
        let (x, y): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        let frame = ScatterVisual::new().update(
            &view_of(x, y),
            &VisualSettings::default(),
            Viewport::new(width, height),
            None,
        );
        let m = frame.layout().margin;
        prop_assert!(frame.solution.iterations <= 2);
        prop_assert!(m.top >= 0.0 && m.right >= 0.0 && m.bottom >= 0.0 && m.left >= 0.0);
    }
}
