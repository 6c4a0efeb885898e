//! Value formatting: display units, axis ticks, tooltip values, dates

use crate::{PrimitiveValue, ValueType};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Fixed display format for date-typed columns
pub const DATE_FORMAT: &str = "%m/%d/%Y";

// ============================================================================
// STRATEGY PATTERN: Value Formatter
// ============================================================================

/// Strategy trait for turning numbers into display text
pub trait ValueFormatter: Send + Sync {
    fn format(&self, value: f64) -> String;
}

/// Display unit applied to axis tick labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    #[default]
    Auto,
    None,
    Thousands,
    Millions,
    Billions,
    Trillions,
}

impl DisplayUnit {
    pub fn divisor(&self) -> f64 {
        match self {
            Self::Auto | Self::None => 1.0,
            Self::Thousands => 1e3,
            Self::Millions => 1e6,
            Self::Billions => 1e9,
            Self::Trillions => 1e12,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Auto | Self::None => "",
            Self::Thousands => "K",
            Self::Millions => "M",
            Self::Billions => "bn",
            Self::Trillions => "T",
        }
    }

    /// Name appended to axis titles, `None` when no scaling applies
    pub fn title(&self) -> Option<&'static str> {
        match self {
            Self::Auto | Self::None => None,
            Self::Thousands => Some("Thousands"),
            Self::Millions => Some("Millions"),
            Self::Billions => Some("Billions"),
            Self::Trillions => Some("Trillions"),
        }
    }

    /// Resolve `Auto` against the largest magnitude on the axis
    pub fn resolve(self, max_abs: f64) -> Self {
        if self != Self::Auto {
            return self;
        }
        match max_abs.abs() {
            v if v >= 1e12 => Self::Trillions,
            v if v >= 1e9 => Self::Billions,
            v if v >= 1e6 => Self::Millions,
            v if v >= 1e3 => Self::Thousands,
            _ => Self::None,
        }
    }
}

/// Axis tick formatter: display unit scaling plus fixed or automatic precision
#[derive(Debug, Clone, Copy)]
pub struct AxisValueFormatter {
    pub unit: DisplayUnit,
    pub precision: Option<usize>,
}

impl AxisValueFormatter {
    pub fn new(unit: DisplayUnit, precision: Option<usize>) -> Self {
        Self { unit, precision }
    }
}

impl ValueFormatter for AxisValueFormatter {
    fn format(&self, value: f64) -> String {
        let scaled = value / self.unit.divisor();
        let text = match self.precision {
            Some(decimals) => format!("{:.prec$}", scaled, prec = decimals),
            None => trim_decimals(scaled, 2),
        };
        format!("{}{}", text, self.unit.suffix())
    }
}

/// General-purpose formatter used for tooltip values and data labels
#[derive(Debug, Clone, Default)]
pub struct DefaultNumberFormatter;

impl ValueFormatter for DefaultNumberFormatter {
    fn format(&self, value: f64) -> String {
        trim_decimals(value, 4)
    }
}

/// Format with at most `max_decimals`, dropping trailing zeros
pub fn trim_decimals(value: f64, max_decimals: usize) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let text = format!("{:.prec$}", value, prec = max_decimals);
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    if text == "-0" { "0".to_string() } else { text }
}

/// Format epoch milliseconds with [`DATE_FORMAT`]
pub fn format_date(millis: f64) -> String {
    DateTime::from_timestamp_millis(millis as i64)
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Format a cell for display according to its column's value type
pub fn format_primitive(value: &PrimitiveValue, value_type: ValueType) -> String {
    match (value_type, value) {
        (ValueType::Date, v) => value_type
            .coerce_number(v)
            .map(format_date)
            .unwrap_or_else(|| v.to_key()),
        (_, PrimitiveValue::Number(n)) => DefaultNumberFormatter.format(*n),
        (_, PrimitiveValue::Text(s)) => s.clone(),
        (_, PrimitiveValue::Bool(b)) => b.to_string(),
    }
}
