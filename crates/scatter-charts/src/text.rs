//! Text measurement used by the layout solver

/// Strategy trait for measuring rendered label text
pub trait TextMeasurer: Send + Sync {
    /// Rendered width in pixels
    fn width(&self, text: &str, font_size: f64) -> f64;

    /// Line height in pixels
    fn height(&self, font_size: f64) -> f64 {
        (font_size * 1.2).ceil()
    }
}

impl std::fmt::Debug for dyn TextMeasurer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TextMeasurer")
    }
}

/// Character-class width estimate for a proportional sans-serif face.
///
/// Used off-DOM (tests, layout before mount) where no real text metrics exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTextMeasurer;

impl ApproxTextMeasurer {
    fn char_em(c: char) -> f64 {
        match c {
            '.' | ',' | ':' | ';' | '\'' | '!' | '|' | 'i' | 'l' | 'j' => 0.28,
            ' ' | '-' | '(' | ')' | 'f' | 't' | 'r' => 0.36,
            '0'..='9' => 0.56,
            'm' | 'w' | 'M' | 'W' => 0.86,
            c if c.is_uppercase() => 0.68,
            _ => 0.52,
        }
    }
}

impl TextMeasurer for ApproxTextMeasurer {
    fn width(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(Self::char_em).sum::<f64>() * font_size
    }
}
