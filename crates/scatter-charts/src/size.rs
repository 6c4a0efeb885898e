//! Bubble size projection
//!
//! A size measure is projected onto a target pixel *area* range that scales with the
//! viewport, then converted to a diameter. Radii are re-derived on every render since
//! they depend on the current viewport and the whole data set's size range.

use scatter_core::Viewport;
use std::f64::consts::PI;

/// Marker radius when no size measure or value is available
pub const DEFAULT_BUBBLE_RADIUS: f64 = 6.0;
/// Projected sizes are diameters; divide to get a radius
pub const BUBBLE_SIZE_DIVIDER: f64 = 2.0;

pub const MIN_SIZE_RANGE: f64 = 200.0;
pub const MAX_SIZE_RANGE: f64 = 3000.0;
/// Reference chart area (300 x 300) the size ranges are calibrated for
pub const AREA_OF_300_BY_300_CHART: f64 = 90_000.0;

/// Closed numeric range with cached delta
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeRange {
    pub min_range: f64,
    pub max_range: f64,
    pub delta: f64,
}

impl SizeRange {
    pub fn new(min_range: f64, max_range: f64) -> Self {
        Self {
            min_range,
            max_range,
            delta: max_range - min_range,
        }
    }

    /// Range over the finite values, `None` if there are none
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        (min <= max).then(|| Self::new(min, max))
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min_range && value <= self.max_range
    }
}

/// Target pixel-area range for the current viewport
pub fn bubble_pixel_area_range(viewport: Viewport) -> SizeRange {
    let ratio = if viewport.is_empty() {
        1.0
    } else {
        let side = viewport.min_side();
        side * side / AREA_OF_300_BY_300_CHART
    };
    SizeRange::new(
        (MIN_SIZE_RANGE * ratio).round(),
        (MAX_SIZE_RANGE * ratio).round(),
    )
}

/// Linear projection of `value` from `actual` into `pixel`.
///
/// Degenerate ranges fall back to a containment check instead of dividing.
pub fn project(value: f64, actual: &SizeRange, pixel: &SizeRange) -> Option<f64> {
    if actual.delta == 0.0 || pixel.delta == 0.0 {
        return actual.contains(value).then_some(pixel.min_range);
    }
    let relative = (value - actual.min_range) / actual.delta;
    Some(pixel.min_range + relative * pixel.delta)
}

/// Project a raw size onto a marker diameter in whole pixels.
///
/// `None` means "use the default radius".
pub fn project_size_to_pixels(
    size: f64,
    actual: Option<&SizeRange>,
    pixel: &SizeRange,
) -> Option<f64> {
    if !size.is_finite() {
        return None;
    }
    let Some(actual) = actual else {
        return Some(DEFAULT_BUBBLE_RADIUS * BUBBLE_SIZE_DIVIDER);
    };

    let area = if actual.delta == 0.0 {
        if !actual.contains(size) {
            return None;
        }
        pixel.max_range
    } else {
        let value = size.clamp(actual.min_range, actual.max_range);
        project(value, actual, pixel)?
    };

    Some(((area.max(0.0) / PI).sqrt() * 2.0).round())
}

/// Marker radius for a point's size value at the current viewport
pub fn bubble_radius(size: Option<f64>, actual: Option<&SizeRange>, viewport: Viewport) -> f64 {
    size.and_then(|value| {
        project_size_to_pixels(value, actual, &bubble_pixel_area_range(viewport))
    })
    .map(|diameter| diameter / BUBBLE_SIZE_DIVIDER)
    .unwrap_or(DEFAULT_BUBBLE_RADIUS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pixel_area_range_scales_with_viewport() {
        let reference = bubble_pixel_area_range(Viewport::new(300.0, 500.0));
        assert_eq!(reference, SizeRange::new(200.0, 3000.0));

        let double = bubble_pixel_area_range(Viewport::new(600.0, 600.0));
        assert_eq!(double, SizeRange::new(800.0, 12000.0));

        let empty = bubble_pixel_area_range(Viewport::new(0.0, 0.0));
        assert_eq!(empty, SizeRange::new(200.0, 3000.0));
    }

    #[test]
    fn test_projection_endpoints() {
        let actual = SizeRange::new(10.0, 20.0);
        let pixel = SizeRange::new(200.0, 3000.0);

        // sqrt(200 / pi) * 2 = 15.96, sqrt(3000 / pi) * 2 = 61.80
        assert_eq!(project_size_to_pixels(10.0, Some(&actual), &pixel), Some(16.0));
        assert_eq!(project_size_to_pixels(20.0, Some(&actual), &pixel), Some(62.0));
        // clamped into the actual range
        assert_eq!(project_size_to_pixels(500.0, Some(&actual), &pixel), Some(62.0));
    }

    #[test]
    fn test_missing_range_uses_default() {
        let pixel = SizeRange::new(200.0, 3000.0);
        assert_eq!(project_size_to_pixels(5.0, None, &pixel), Some(12.0));
        assert_eq!(bubble_radius(None, None, Viewport::new(300.0, 300.0)), 6.0);
    }

    #[test]
    fn test_zero_delta_ranges() {
        let actual = SizeRange::new(7.0, 7.0);
        let pixel = SizeRange::new(200.0, 3000.0);
        assert_eq!(project_size_to_pixels(7.0, Some(&actual), &pixel), Some(62.0));
        assert_eq!(project_size_to_pixels(8.0, Some(&actual), &pixel), None);

        let flat_pixel = SizeRange::new(200.0, 200.0);
        assert_eq!(project(7.0, &actual, &flat_pixel), Some(200.0));
        assert_eq!(project(9.0, &actual, &flat_pixel), None);
        let spread = SizeRange::new(0.0, 10.0);
        assert_eq!(project(5.0, &spread, &flat_pixel), Some(200.0));
    }

    #[test]
    fn test_out_of_range_single_value_falls_back_to_default_radius() {
        let actual = SizeRange::new(7.0, 7.0);
        let radius = bubble_radius(Some(8.0), Some(&actual), Viewport::new(300.0, 300.0));
        assert_eq!(radius, DEFAULT_BUBBLE_RADIUS);
    }

    #[test]
    fn test_size_range_from_values() {
        let range = SizeRange::from_values([3.0, f64::NAN, -1.0, 8.0]).unwrap();
        assert_eq!(range, SizeRange::new(-1.0, 8.0));
        assert!(SizeRange::from_values(Vec::new()).is_none());
    }

    proptest! {
        #[test]
        fn prop_projection_is_monotonic(
            min in -1e6f64..1e6,
            span in 0.0f64..1e6,
            a in 0.0f64..1.0,
            b in 0.0f64..1.0,
            side in 1.0f64..2000.0,
        ) {
            let actual = SizeRange::new(min, min + span);
            let pixel = bubble_pixel_area_range(Viewport::new(side, side));
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let p_lo = project_size_to_pixels(min + lo * span, Some(&actual), &pixel);
            let p_hi = project_size_to_pixels(min + hi * span, Some(&actual), &pixel);
            prop_assert!(p_lo.is_some() && p_hi.is_some());
            prop_assert!(p_lo <= p_hi);
        }

        #[test]
        fn prop_zero_delta_is_finite_or_default(value in -1e9f64..1e9, probe in -1e9f64..1e9) {
            let actual = SizeRange::new(value, value);
            let pixel = SizeRange::new(200.0, 3000.0);
            if let Some(d) = project_size_to_pixels(probe, Some(&actual), &pixel) {
                prop_assert!(d.is_finite());
            }
            let r = bubble_radius(Some(probe), Some(&actual), Viewport::new(300.0, 300.0));
            prop_assert!(r.is_finite() && r > 0.0);
        }
    }
}
