//! Plot-ready data point model

use crate::shapes::Shape;
use scatter_core::{PrimitiveValue, ValueType, format_primitive};
use std::sync::OnceLock;

/// Stable key for enter/update/exit matching and selection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub category_index: usize,
    pub series_index: usize,
    pub key: String,
    /// Key of the owning series, shared with its legend entry
    pub series_key: String,
}

impl Identity {
    pub fn new(category_index: usize, series_index: usize, category: &str, series: &str) -> Self {
        Self {
            category_index,
            series_index,
            key: format!("{category}\u{1f}{series}\u{1f}{series_index}"),
            series_key: series.to_string(),
        }
    }
}

/// Back-reference into the size measure, resolved to a radius at render time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeMeasure {
    pub value: Option<f64>,
    pub series_index: usize,
    pub row_index: usize,
}

/// One tooltip row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipItem {
    pub display_name: String,
    pub value: String,
}

impl TooltipItem {
    pub fn new(display_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            value: value.into(),
        }
    }
}

/// Category text formatted on first access only
#[derive(Debug, Clone, Default)]
pub struct FormattedCategory {
    value: Option<PrimitiveValue>,
    value_type: ValueType,
    text: OnceLock<String>,
}

impl FormattedCategory {
    pub fn new(value: Option<PrimitiveValue>, value_type: ValueType) -> Self {
        Self {
            value,
            value_type,
            text: OnceLock::new(),
        }
    }

    pub fn get(&self) -> &str {
        self.text.get_or_init(|| {
            self.value
                .as_ref()
                .map(|v| format_primitive(v, self.value_type))
                .unwrap_or_default()
        })
    }

    pub fn is_formatted(&self) -> bool {
        self.text.get().is_some()
    }
}

impl PartialEq for FormattedCategory {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.value_type == other.value_type
    }
}

/// One visual marker
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
    pub size: Option<SizeMeasure>,
    pub color_fill: String,
    /// `None` renders the marker hollow
    pub fill: Option<String>,
    pub stroke: String,
    pub stroke_width: f64,
    pub shape: Shape,
    pub image: Option<String>,
    /// Degrees
    pub rotation: f64,
    pub backdrop: Option<String>,
    pub x_start: Option<f64>,
    pub x_end: Option<f64>,
    pub y_start: Option<f64>,
    pub y_end: Option<f64>,
    pub identity: Identity,
    pub formatted_category: FormattedCategory,
    pub selected: bool,
    pub highlight: bool,
    pub tooltip_info: Vec<TooltipItem>,
}

impl DataPoint {
    /// Plain point at `(x, y)` with default styling
    pub fn new(x: f64, y: f64, identity: Identity) -> Self {
        let color = scatter_core::colors::PALETTE[0].to_string();
        Self {
            x,
            y,
            size: None,
            stroke: color.clone(),
            color_fill: color,
            fill: None,
            stroke_width: 1.0,
            shape: Shape::Circle,
            image: None,
            rotation: 0.0,
            backdrop: None,
            x_start: None,
            x_end: None,
            y_start: None,
            y_end: None,
            identity,
            formatted_category: FormattedCategory::default(),
            selected: false,
            highlight: false,
            tooltip_info: Vec::new(),
        }
    }

    /// Raw size value, if a size measure is bound and present at this row
    pub fn size_value(&self) -> Option<f64> {
        self.size.and_then(|s| s.value)
    }
}

/// Legend entry for one series
#[derive(Debug, Clone, PartialEq)]
pub struct LegendDataPoint {
    pub label: String,
    pub color: String,
    pub identity: String,
    pub selected: bool,
}

/// Legend contents
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LegendData {
    pub title: Option<String>,
    pub data_points: Vec<LegendDataPoint>,
}

impl LegendData {
    pub fn is_empty(&self) -> bool {
        self.data_points.is_empty()
    }
}
