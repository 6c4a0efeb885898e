//! Role-tagged tabular input (the host data view)
//!
//! Columns are located by semantic role, never by name or position.

use crate::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ============================================================================
// ROLES & VALUE TYPES
// ============================================================================

/// Semantic role a column is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Category,
    Series,
    X,
    Y,
    Size,
    Shape,
    ColorFill,
    Image,
    Rotation,
    Backdrop,
    XStart,
    XEnd,
    YStart,
    YEnd,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Series => "Series",
            Self::X => "X",
            Self::Y => "Y",
            Self::Size => "Size",
            Self::Shape => "Shape",
            Self::ColorFill => "ColorFill",
            Self::Image => "Image",
            Self::Rotation => "Rotation",
            Self::Backdrop => "Backdrop",
            Self::XStart => "XStart",
            Self::XEnd => "XEnd",
            Self::YStart => "YStart",
            Self::YEnd => "YEnd",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Value type descriptor of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    Numeric,
    Date,
    Text,
    Bool,
}

impl ValueType {
    pub fn is_date(&self) -> bool {
        matches!(self, Self::Date)
    }

    /// Coerce a cell into a plottable number.
    ///
    /// Dates become epoch milliseconds. NaN and unparseable text yield `None`.
    pub fn coerce_number(&self, value: &PrimitiveValue) -> Option<f64> {
        let n = match (self, value) {
            (Self::Date, PrimitiveValue::Text(s)) => parse_date_millis(s),
            (_, PrimitiveValue::Number(n)) => Some(*n),
            (Self::Numeric | Self::Text, PrimitiveValue::Text(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        n.filter(|v| !v.is_nan())
    }
}

/// Parse an ISO-ish date string into epoch milliseconds
pub fn parse_date_millis(s: &str) -> Option<f64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis() as f64);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc().timestamp_millis() as f64);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis() as f64)
}

/// Single cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimitiveValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl PrimitiveValue {
    /// Raw string form, used for identity keys and URL-bearing roles
    pub fn to_key(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for PrimitiveValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for PrimitiveValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

// ============================================================================
// COLUMNS
// ============================================================================

/// Column metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSource {
    pub display_name: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default)]
    pub query_name: String,
}

impl ColumnSource {
    pub fn new(display_name: impl Into<String>, role: Role) -> Self {
        let display_name = display_name.into();
        Self {
            query_name: display_name.clone(),
            display_name,
            roles: vec![role],
            value_type: ValueType::Numeric,
        }
    }

    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Grouping column (category axis, colour fill, image URLs, backdrop URL)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryColumn {
    pub source: ColumnSource,
    #[serde(default)]
    pub values: Vec<Option<PrimitiveValue>>,
}

impl CategoryColumn {
    pub fn new(source: ColumnSource, values: Vec<Option<PrimitiveValue>>) -> Self {
        Self { source, values }
    }

    pub fn value(&self, index: usize) -> Option<&PrimitiveValue> {
        self.values.get(index).and_then(Option::as_ref)
    }
}

/// Measure column with optional highlight values parallel to `values`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueColumn {
    pub source: ColumnSource,
    #[serde(default)]
    pub values: Vec<Option<PrimitiveValue>>,
    #[serde(default)]
    pub highlights: Option<Vec<Option<PrimitiveValue>>>,
}

impl ValueColumn {
    pub fn new(source: ColumnSource, values: Vec<Option<PrimitiveValue>>) -> Self {
        Self {
            source,
            values,
            highlights: None,
        }
    }

    pub fn with_highlights(mut self, highlights: Vec<Option<PrimitiveValue>>) -> Self {
        self.highlights = Some(highlights);
        self
    }

    pub fn value(&self, index: usize) -> Option<&PrimitiveValue> {
        self.values.get(index).and_then(Option::as_ref)
    }

    /// Numeric value at `index`, coerced by the column's value type
    pub fn number(&self, index: usize) -> Option<f64> {
        self.value(index)
            .and_then(|v| self.source.value_type.coerce_number(v))
    }

    pub fn highlight(&self, index: usize) -> Option<&PrimitiveValue> {
        self.highlights
            .as_ref()
            .and_then(|h| h.get(index))
            .and_then(Option::as_ref)
    }

    pub fn has_highlights(&self) -> bool {
        self.highlights.as_ref().is_some_and(|h| !h.is_empty())
    }
}

/// One series group: the measure columns for a single series value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueGroup {
    #[serde(default)]
    pub name: Option<PrimitiveValue>,
    #[serde(default)]
    pub columns: Vec<ValueColumn>,
}

impl ValueGroup {
    pub fn new(name: Option<PrimitiveValue>, columns: Vec<ValueColumn>) -> Self {
        Self { name, columns }
    }

    pub fn column(&self, role: Role) -> Option<&ValueColumn> {
        self.columns.iter().find(|c| c.source.has_role(role))
    }
}

// ============================================================================
// DATA VIEW
// ============================================================================

/// Tabular result set handed over by the host on every update
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataView {
    #[serde(default)]
    pub categories: Vec<CategoryColumn>,
    #[serde(default)]
    pub groups: Vec<ValueGroup>,
    /// Source of the dynamic series grouping, when one is bound
    #[serde(default)]
    pub series: Option<ColumnSource>,
}

impl DataView {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn category(&self, role: Role) -> Option<&CategoryColumn> {
        self.categories.iter().find(|c| c.source.has_role(role))
    }

    pub fn has_dynamic_series(&self) -> bool {
        self.series.is_some()
    }

    pub fn has_highlights(&self) -> bool {
        self.groups
            .iter()
            .flat_map(|g| g.columns.iter())
            .any(ValueColumn::has_highlights)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.category(role).is_some() || self.groups.iter().any(|g| g.column(role).is_some())
    }

    /// Number of category rows; measure length when no category is bound
    pub fn row_count(&self) -> usize {
        match self.category(Role::Category) {
            Some(category) => category.values.len(),
            None => self
                .groups
                .iter()
                .flat_map(|g| g.columns.iter())
                .map(|c| c.values.len())
                .max()
                .unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_coercion() {
        let date = ValueType::Date;
        let ms = date.coerce_number(&PrimitiveValue::from("2024-01-02")).unwrap();
        assert_eq!(ms, 1_704_153_600_000.0);
        assert_eq!(date.coerce_number(&PrimitiveValue::from(5.0)), Some(5.0));
        assert_eq!(date.coerce_number(&PrimitiveValue::from("yesterday")), None);
    }

    #[test]
    fn test_nan_is_missing() {
        let numeric = ValueType::Numeric;
        assert_eq!(numeric.coerce_number(&PrimitiveValue::Number(f64::NAN)), None);
        assert_eq!(numeric.coerce_number(&PrimitiveValue::from(" 42 ")), Some(42.0));
        assert_eq!(numeric.coerce_number(&PrimitiveValue::Bool(true)), None);
    }

    #[test]
    fn test_data_view_from_json() {
        let json = r#"{
            "categories": [
                { "source": { "display_name": "City", "roles": ["Category"], "value_type": "text" },
                  "values": ["Oslo", "Rome", null] }
            ],
            "groups": [
                { "columns": [
                    { "source": { "display_name": "Sales", "roles": ["X"] }, "values": [1, 2, 3] },
                    { "source": { "display_name": "Profit", "roles": ["Y"] }, "values": [4, null, 6],
                      "highlights": [null, null, 6] }
                ] }
            ]
        }"#;

        let view = DataView::from_json(json).unwrap();
        assert_eq!(view.row_count(), 3);
        assert!(view.has_highlights());
        assert!(!view.has_dynamic_series());
        let group = &view.groups[0];
        assert_eq!(group.column(Role::Y).unwrap().number(1), None);
        assert_eq!(group.column(Role::X).unwrap().number(2), Some(3.0));
    }

    #[test]
    fn test_row_count_without_category() {
        let x = ValueColumn::new(ColumnSource::new("X", Role::X), vec![Some(1.0.into()); 4]);
        let view = DataView {
            groups: vec![ValueGroup::new(None, vec![x])],
            ..Default::default()
        };
        assert_eq!(view.row_count(), 4);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(DataView::from_json("{ nope").is_err());
    }
}
