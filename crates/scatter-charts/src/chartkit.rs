//! # chartkit
//!
//! Core chart primitives: continuous scales, tick generation, SVG path builder.
//! Implements Strategy pattern for scale behaviour.

use std::fmt::Write;

// ============================================================================
// STRATEGY PATTERN: Scale Trait
// ============================================================================

/// Strategy trait for scales (maps domain values to range values)
pub trait Scale: Send + Sync {
    /// Scale a value from domain to range
    fn scale(&self, value: f64) -> f64;

    /// Inverse scale (range to domain)
    fn invert(&self, value: f64) -> f64;

    /// Generate tick values
    fn ticks(&self, count: usize) -> Vec<f64>;
}

// ============================================================================
// TICK ARITHMETIC
// ============================================================================

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = 1.4142135623730951; // sqrt(2)
/// Upper bound on generated ticks; larger sets mean a degenerate step
const MAX_TICKS: i64 = 10_000;

/// Step between "nice" ticks. Negative values encode `1 / step` for sub-unit steps
/// so that tick arithmetic stays exact in decimal.
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    let inc = if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -10f64.powf(-power) / factor
    };
    // subnormal spans overflow 10^-power
    if inc.is_finite() { inc } else { 0.0 }
}

/// Nice tick values covering `[start, stop]`, roughly `count` of them
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if !start.is_finite() || !stop.is_finite() || count == 0 {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let (lo, hi, reverse) = if stop < start {
        (stop, start, true)
    } else {
        (start, stop, false)
    };

    let inc = tick_increment(lo, hi, count);
    if inc == 0.0 {
        return Vec::new();
    }

    let (i0, i1) = if inc > 0.0 {
        ((lo / inc).ceil(), (hi / inc).floor())
    } else {
        ((lo * -inc).ceil(), (hi * -inc).floor())
    };
    if !i0.is_finite() || !i1.is_finite() || i1 - i0 >= MAX_TICKS as f64 {
        return Vec::new();
    }
    let (i0, i1) = (i0 as i64, i1 as i64);

    let mut values = if inc > 0.0 {
        (i0..=i1).map(|i| i as f64 * inc).collect::<Vec<_>>()
    } else {
        let inv = -inc;
        (i0..=i1).map(|i| i as f64 / inv).collect::<Vec<_>>()
    };

    if reverse {
        values.reverse();
    }
    values
}

// ============================================================================
// LINEAR SCALE
// ============================================================================

/// Linear scale (D3-style continuous scale)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new() -> Self {
        Self {
            domain: (0.0, 1.0),
            range: (0.0, 1.0),
        }
    }

    pub fn domain(mut self, min: f64, max: f64) -> Self {
        self.domain = (min, max);
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.range = (min, max);
        self
    }

    /// Extend the domain outwards to nice round values for `count` ticks
    pub fn nice(mut self, count: usize) -> Self {
        let (mut start, mut stop) = self.domain;
        let reverse = stop < start;
        if reverse {
            std::mem::swap(&mut start, &mut stop);
        }

        let mut previous = 0.0;
        for _ in 0..10 {
            let step = tick_increment(start, stop, count);
            if step == previous {
                break;
            } else if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            } else {
                break;
            }
            previous = step;
        }

        self.domain = if reverse { (stop, start) } else { (start, stop) };
        self
    }

    /// Get domain bounds
    pub fn domain_bounds(&self) -> (f64, f64) {
        self.domain
    }

    /// Get range bounds
    pub fn range_bounds(&self) -> (f64, f64) {
        self.range
    }

    /// Absolute pixel extent of the range
    pub fn range_extent(&self) -> f64 {
        (self.range.1 - self.range.0).abs()
    }
}

impl Default for LinearScale {
    fn default() -> Self {
        Self::new()
    }
}

impl Scale for LinearScale {
    fn scale(&self, value: f64) -> f64 {
        let (d_min, d_max) = self.domain;
        let (r_min, r_max) = self.range;

        if (d_max - d_min).abs() < f64::EPSILON {
            return (r_min + r_max) / 2.0;
        }

        let normalized = (value - d_min) / (d_max - d_min);
        r_min + normalized * (r_max - r_min)
    }

    fn invert(&self, value: f64) -> f64 {
        let (d_min, d_max) = self.domain;
        let (r_min, r_max) = self.range;

        if (r_max - r_min).abs() < f64::EPSILON {
            return (d_min + d_max) / 2.0;
        }

        let normalized = (value - r_min) / (r_max - r_min);
        d_min + normalized * (d_max - d_min)
    }

    fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count)
    }
}

// ============================================================================
// PATH BUILDER (fluent API)
// ============================================================================

/// `-0.0` prints as "-0.00"; adding `0.0` folds it to positive zero
#[inline]
fn unsigned_zero(v: f64) -> f64 {
    v + 0.0
}

/// SVG path builder with fluent API
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    commands: String,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self {
            commands: String::with_capacity(128),
        }
    }

    pub fn move_to(mut self, x: f64, y: f64) -> Self {
        let _ = write!(self.commands, "M{:.2},{:.2}", unsigned_zero(x), unsigned_zero(y));
        self
    }

    pub fn line_to(mut self, x: f64, y: f64) -> Self {
        let _ = write!(self.commands, "L{:.2},{:.2}", unsigned_zero(x), unsigned_zero(y));
        self
    }

    pub fn arc_to(
        mut self,
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    ) -> Self {
        let _ = write!(
            self.commands,
            "A{:.2},{:.2},{:.2},{},{},{:.2},{:.2}",
            rx,
            ry,
            rotation,
            large_arc as u8,
            sweep as u8,
            unsigned_zero(x),
            unsigned_zero(y)
        );
        self
    }

    /// Closed polygon through `points`
    pub fn polygon(self, points: &[(f64, f64)]) -> Self {
        let Some((&(x0, y0), rest)) = points.split_first() else {
            return self;
        };
        rest.iter()
            .fold(self.move_to(x0, y0), |b, &(x, y)| b.line_to(x, y))
            .close()
    }

    pub fn close(mut self) -> Self {
        self.commands.push('Z');
        self
    }

    pub fn build(self) -> String {
        self.commands
    }
}

// ============================================================================
// TESTS
// ============================================================================
