//! Colour palette, resolution strategy and UI colour constants

use std::collections::HashMap;

pub const TEXT_PRIMARY: &str = "#333333";
pub const TEXT_MUTED: &str = "#777777";
pub const AXIS_LINE: &str = "#c8c8c8";
pub const GRID: &str = "#eaeaea";
pub const CROSSHAIR: &str = "#808080";
pub const BG_PANEL: &str = "#ffffff";
pub const LEGEND_LABEL: &str = "#666666";
pub const CATEGORY_LABEL: &str = "#777777";

/// Default theme palette, assigned in order to new series/measure keys
pub const PALETTE: &[&str] = &[
    "#01B8AA", "#374649", "#FD625E", "#F2C80F", "#5F6B6D", "#8AD4EB", "#FE9666", "#A66999",
    "#3599B8", "#DFBFBF", "#4AC5BB", "#5F6B6D", "#FB8281", "#F4D25A", "#7F898A", "#A4DDEE",
];

// ============================================================================
// STRATEGY PATTERN: Colour Resolution
// ============================================================================

/// Strategy trait standing in for the host colour palette service
pub trait ColorResolver {
    /// Colour of a dynamic series value
    fn series_color(&mut self, series_key: &str) -> String;

    /// Colour of a measure when no dynamic series is bound
    fn measure_color(&mut self, measure_key: &str) -> String;
}

/// Palette-backed resolver; keys keep their colour for the resolver's lifetime
#[derive(Debug, Clone)]
pub struct PaletteColorResolver {
    palette: Vec<String>,
    assigned: HashMap<String, String>,
    default_color: Option<String>,
}

impl PaletteColorResolver {
    pub fn new() -> Self {
        Self {
            palette: PALETTE.iter().map(|c| c.to_string()).collect(),
            assigned: HashMap::new(),
            default_color: None,
        }
    }

    /// Fixed colour for all measure-coloured points (data point setting)
    pub fn with_default_color(mut self, color: Option<String>) -> Self {
        self.default_color = color;
        self
    }

    fn assign(&mut self, key: String) -> String {
        let next = self.palette[self.assigned.len() % self.palette.len()].clone();
        self.assigned.entry(key).or_insert(next).clone()
    }
}

impl Default for PaletteColorResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorResolver for PaletteColorResolver {
    fn series_color(&mut self, series_key: &str) -> String {
        self.assign(format!("series:{series_key}"))
    }

    fn measure_color(&mut self, measure_key: &str) -> String {
        match &self.default_color {
            Some(color) => color.clone(),
            None => self.assign(format!("measure:{measure_key}")),
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Parse `#rrggbb` or `#rgb`
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            let mut channels = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some((channels.next()??, channels.next()??, channels.next()??))
        }
        _ => None,
    }
}

/// Darken a hex colour by `factor` (0..1); non-hex colours pass through
pub fn darken(color: &str, factor: f64) -> String {
    let keep = (1.0 - factor).clamp(0.0, 1.0);
    match parse_hex(color) {
        Some((r, g, b)) => format!(
            "#{:02x}{:02x}{:02x}",
            (r as f64 * keep).round() as u8,
            (g as f64 * keep).round() as u8,
            (b as f64 * keep).round() as u8,
        ),
        None => color.to_string(),
    }
}
