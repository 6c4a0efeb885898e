//! Marker shapes
//!
//! Every shape takes a target area in px² and derives its own characteristic size so
//! the drawn outline covers that area, centred on the origin.

use crate::chartkit::PathBuilder;
use scatter_core::PrimitiveValue;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

const SQRT3: f64 = 1.7320508075688772;

/// Fixed shape list; the order defines numeric shape indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shape {
    #[default]
    Circle,
    Cross,
    Diamond,
    Square,
    TriangleUp,
    TriangleDown,
    Star,
    Hexagon,
    X,
    UpArrow,
    DownArrow,
}

impl Shape {
    pub const ALL: [Shape; 11] = [
        Self::Circle,
        Self::Cross,
        Self::Diamond,
        Self::Square,
        Self::TriangleUp,
        Self::TriangleDown,
        Self::Star,
        Self::Hexagon,
        Self::X,
        Self::UpArrow,
        Self::DownArrow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Cross => "cross",
            Self::Diamond => "diamond",
            Self::Square => "square",
            Self::TriangleUp => "triangle-up",
            Self::TriangleDown => "triangle-down",
            Self::Star => "star",
            Self::Hexagon => "hexagon",
            Self::X => "x",
            Self::UpArrow => "up-arrow",
            Self::DownArrow => "down-arrow",
        }
    }

    /// Case-insensitive lookup; `-`, `_` and spaces are ignored
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        Self::ALL
            .into_iter()
            .find(|shape| shape.name().replace('-', "") == key)
    }

    /// Index into [`Shape::ALL`]; fractional indices are floored
    pub fn from_index(index: f64) -> Option<Self> {
        if !index.is_finite() || index < 0.0 {
            return None;
        }
        Self::ALL.get(index.floor() as usize).copied()
    }

    /// Outline vertices for polygonal shapes; `None` for the circle
    pub fn vertices(&self, area: f64) -> Option<Vec<(f64, f64)>> {
        let a = if area.is_finite() { area.max(0.0) } else { 0.0 };
        let points = match self {
            Self::Circle => return None,
            Self::Cross => cross_points(a),
            Self::Diamond => {
                let tan30 = (PI / 6.0).tan();
                let ry = (a / (2.0 * tan30)).sqrt();
                let rx = ry * tan30;
                vec![(0.0, -ry), (rx, 0.0), (0.0, ry), (-rx, 0.0)]
            }
            Self::Square => {
                let r = a.sqrt() / 2.0;
                vec![(-r, -r), (r, -r), (r, r), (-r, r)]
            }
            Self::TriangleUp => {
                let rx = (a / SQRT3).sqrt();
                let ry = rx * SQRT3 / 2.0;
                vec![(0.0, -ry), (rx, ry), (-rx, ry)]
            }
            Self::TriangleDown => {
                let rx = (a / SQRT3).sqrt();
                let ry = rx * SQRT3 / 2.0;
                vec![(0.0, ry), (rx, -ry), (-rx, -ry)]
            }
            Self::Star => {
                // inner/outer radius ratio of a regular pentagram
                let k = (PI / 10.0).sin() / (3.0 * PI / 10.0).sin();
                let outer = (a / (5.0 * k * (PI / 5.0).sin())).sqrt();
                (0..10)
                    .map(|i| {
                        let angle = -PI / 2.0 + i as f64 * PI / 5.0;
                        let r = if i % 2 == 0 { outer } else { outer * k };
                        (r * angle.cos(), r * angle.sin())
                    })
                    .collect()
            }
            Self::Hexagon => {
                let r = (2.0 * a / (3.0 * SQRT3)).sqrt();
                (0..6)
                    .map(|i| {
                        let angle = -PI / 2.0 + i as f64 * PI / 3.0;
                        (r * angle.cos(), r * angle.sin())
                    })
                    .collect()
            }
            Self::X => cross_points(a)
                .into_iter()
                .map(|(x, y)| ((x - y) * FRAC_1_SQRT_2, (x + y) * FRAC_1_SQRT_2))
                .collect(),
            Self::UpArrow => arrow_points(a, 1.0),
            Self::DownArrow => arrow_points(a, -1.0),
        };
        Some(points)
    }

    /// SVG path for this shape covering `area` px²
    pub fn path(&self, area: f64) -> String {
        match self.vertices(area) {
            Some(points) => PathBuilder::new().polygon(&points).build(),
            None => {
                let a = if area.is_finite() { area.max(0.0) } else { 0.0 };
                let r = (a / PI).sqrt();
                PathBuilder::new()
                    .move_to(0.0, r)
                    .arc_to(r, r, 0.0, true, true, 0.0, -r)
                    .arc_to(r, r, 0.0, true, true, 0.0, r)
                    .close()
                    .build()
            }
        }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Plus sign made of five squares with side `2r`
fn cross_points(area: f64) -> Vec<(f64, f64)> {
    let r = (area / 5.0).sqrt() / 2.0;
    vec![
        (-3.0 * r, -r),
        (-r, -r),
        (-r, -3.0 * r),
        (r, -3.0 * r),
        (r, -r),
        (3.0 * r, -r),
        (3.0 * r, r),
        (r, r),
        (r, 3.0 * r),
        (-r, 3.0 * r),
        (-r, r),
        (-3.0 * r, r),
    ]
}

/// Arrow head (4u²) on a shaft (8u²); `dir` 1.0 points up, -1.0 down
fn arrow_points(area: f64, dir: f64) -> Vec<(f64, f64)> {
    let u = (area / 12.0).sqrt();
    [
        (0.0, -3.0),
        (2.0, -1.0),
        (1.0, -1.0),
        (1.0, 3.0),
        (-1.0, 3.0),
        (-1.0, -1.0),
        (-2.0, -1.0),
    ]
    .into_iter()
    .map(|(x, y)| (x * u, y * u * dir))
    .collect()
}

/// Resolve a shape-role cell; anything unrecognised is a circle
pub fn resolve_shape(selector: Option<&PrimitiveValue>) -> Shape {
    match selector {
        Some(PrimitiveValue::Number(index)) => Shape::from_index(*index),
        Some(PrimitiveValue::Text(name)) => Shape::from_name(name).or_else(|| {
            name.trim()
                .parse::<f64>()
                .ok()
                .and_then(Shape::from_index)
        }),
        _ => None,
    }
    .unwrap_or_default()
}
