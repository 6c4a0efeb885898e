//! Visual settings (the formatting model), deserialized from host JSON
//!
//! Every field has a default; validation is limited to clamping at use sites.

use crate::{DisplayUnit, Result};
use serde::{Deserialize, Serialize};

/// Data point appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPointSettings {
    /// Colour for all points when no dynamic series is bound
    pub default_color: Option<String>,
    /// Fill markers even without a size measure
    pub fill_point: bool,
    /// Draw a darker outline around markers
    pub outline: bool,
    pub stroke_width: f64,
}

impl Default for DataPointSettings {
    fn default() -> Self {
        Self {
            default_color: None,
            fill_point: false,
            outline: false,
            stroke_width: 1.0,
        }
    }
}

/// Axis configuration (shared by the category/x and value/y axes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisSettings {
    pub show: bool,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub display_units: DisplayUnit,
    pub precision: Option<usize>,
    pub show_title: bool,
    /// Overrides the column display name as axis title
    pub title: Option<String>,
    /// Only meaningful for the y axis: draw it on the right
    pub position_right: bool,
    pub label_color: String,
    pub font_size: f64,
}

impl Default for AxisSettings {
    fn default() -> Self {
        Self {
            show: true,
            start: None,
            end: None,
            display_units: DisplayUnit::Auto,
            precision: None,
            show_title: true,
            title: None,
            position_right: false,
            label_color: crate::colors::TEXT_MUTED.to_string(),
            font_size: 11.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendSettings {
    pub show: bool,
    pub show_title: bool,
    pub title_text: Option<String>,
    pub font_size: f64,
    pub label_color: String,
}

impl Default for LegendSettings {
    fn default() -> Self {
        Self {
            show: true,
            show_title: true,
            title_text: None,
            font_size: 9.0,
            label_color: crate::colors::LEGEND_LABEL.to_string(),
        }
    }
}

/// Per-point category data labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryLabelSettings {
    pub show: bool,
    pub color: String,
    pub font_size: f64,
}

impl Default for CategoryLabelSettings {
    fn default() -> Self {
        Self {
            show: false,
            color: crate::colors::CATEGORY_LABEL.to_string(),
            font_size: 9.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrosshairSettings {
    pub show: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropSettings {
    pub show: bool,
    pub url: Option<String>,
}

impl BackdropSettings {
    /// URL to draw, if the backdrop is switched on
    pub fn active_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| self.show && !u.is_empty())
    }
}

/// Full visual configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualSettings {
    pub data_point: DataPointSettings,
    pub category_axis: AxisSettings,
    pub value_axis: AxisSettings,
    pub legend: LegendSettings,
    pub category_labels: CategoryLabelSettings,
    pub crosshair: CrosshairSettings,
    pub backdrop: BackdropSettings,
}

impl VisualSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse settings, falling back to defaults on malformed input
    pub fn from_json_or_default(json: &str) -> Self {
        Self::from_json(json).unwrap_or_else(|e| {
            tracing::warn!("Falling back to default settings: {}", e);
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_keep_defaults() {
        let settings = VisualSettings::from_json(
            r#"{ "value_axis": { "start": 5, "display_units": "millions" }, "crosshair": { "show": true } }"#,
        )
        .unwrap();

        assert_eq!(settings.value_axis.start, Some(5.0));
        assert_eq!(settings.value_axis.display_units, DisplayUnit::Millions);
        assert!(settings.value_axis.show);
        assert!(settings.crosshair.show);
        assert_eq!(settings.data_point.stroke_width, 1.0);
    }

    #[test]
    fn test_malformed_settings_fall_back() {
        let settings = VisualSettings::from_json_or_default("not json");
        assert_eq!(settings, VisualSettings::default());
    }

    #[test]
    fn test_backdrop_active_url() {
        let mut backdrop = BackdropSettings {
            show: false,
            url: Some("bg.png".into()),
        };
        assert_eq!(backdrop.active_url(), None);
        backdrop.show = true;
        assert_eq!(backdrop.active_url(), Some("bg.png"));
    }
}
