//! Numeric helpers shared by every summary.
//!
//! Rounding follows the dashboard's half-up convention (`-2.5` rounds to `-2`),
//! which differs from [`f64::round`] for negative halves.

use serde::{Serialize, Serializer};

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

/// Rounds half-up to the nearest whole number. Non-finite input becomes 0.
pub fn round_half_up(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    // `value - floor` is exact; `value + 0.5` is not near 0.5 ulp.
    let floor = value.floor();
    if value - floor >= 0.5 { floor + 1.0 } else { floor }
}

/// Rounds to a whole number, as emitted for carbon intensities.
pub fn round_whole(value: f64) -> i64 {
    round_half_up(value) as i64
}

/// Rounds to `decimals` places using the half-up rule.
pub fn round_to(value: f64, decimals: i32) -> Rounded {
    let scale = 10f64.powi(decimals);
    Rounded(round_half_up(value * scale) / scale)
}

/// Rounds to 2 decimals, the precision of every price field.
pub fn round2(value: f64) -> Rounded {
    round_to(value, 2)
}

/// A rounded value that serializes like the legacy documents: whole values
/// without a fractional part (`45`), everything else as a float (`45.5`).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Rounded(pub f64);

impl Rounded {
    pub fn value(self) -> f64 {
        self.0
    }
}

const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

impl Serialize for Rounded {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let v = self.0;
        if v.fract() == 0.0 && v.abs() < MAX_EXACT_INT {
            serializer.serialize_i64(v as i64)
        } else {
            serializer.serialize_f64(v)
        }
    }
}
