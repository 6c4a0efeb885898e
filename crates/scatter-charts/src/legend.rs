//! Legend builder
//!
//! Entries exist only when a dynamic series role is bound; colours come from the same
//! resolver the flattener uses so markers and swatches match.

use crate::flatten::series_key;
use crate::point::{LegendData, LegendDataPoint};
use scatter_core::{ColorResolver, DataView, LegendSettings, format_primitive};
use std::collections::HashSet;

/// Label shown for a series whose grouping value is null
pub const BLANK_SERIES_LABEL: &str = "(Blank)";

pub fn build_legend(
    view: &DataView,
    settings: &LegendSettings,
    colors: &mut dyn ColorResolver,
) -> LegendData {
    let Some(series) = view.series.as_ref() else {
        return LegendData::default();
    };

    let mut seen = HashSet::new();
    let data_points: Vec<LegendDataPoint> = view
        .groups
        .iter()
        .filter_map(|group| {
            let key = series_key(group);
            if !seen.insert(key.clone()) {
                return None;
            }
            let label = group
                .name
                .as_ref()
                .map(|name| format_primitive(name, series.value_type))
                .filter(|label| !label.is_empty())
                .unwrap_or_else(|| BLANK_SERIES_LABEL.to_string());
            Some(LegendDataPoint {
                label,
                color: colors.series_color(&key),
                identity: key,
                selected: false,
            })
        })
        .collect();

    let title = settings.show_title.then(|| {
        settings
            .title_text
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| series.display_name.clone())
    });

    tracing::debug!("Legend: {} entries", data_points.len());
    LegendData { title, data_points }
}
