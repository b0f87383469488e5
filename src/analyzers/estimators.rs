//! Shift-savings estimators: how much carbon intensity drops when demand is
//! moved later by 1, 2, 4 or 8 hours.
//!
//! Which estimator applies depends on the data available. Daily series only
//! support a variance heuristic; an hourly profile allows a direct simulation.

use crate::analyzers::types::ShiftSavings;
use crate::analyzers::utility::round_whole;
use crate::stats::{HOURS_PER_DAY, SeriesStats};

/// Shift durations, in hours, reported by every estimator.
pub const SHIFT_DURATIONS: [u32; 4] = [1, 2, 4, 8];

/// Confidence of a shift-savings figure, from highest to lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarbonConfidence {
    /// Simulated against an observed intra-day profile.
    Detailed,
    /// Derived from measured daily data.
    Measured,
    /// No carbon data; a regional fallback.
    Estimated,
}

impl CarbonConfidence {
    pub fn label(&self) -> &'static str {
        match self {
            CarbonConfidence::Detailed => "detailed",
            CarbonConfidence::Measured => "measured",
            CarbonConfidence::Estimated => "estimated",
        }
    }
}

/// Produces a savings figure for every entry of [`SHIFT_DURATIONS`].
pub trait ShiftSavingsEstimator {
    fn confidence(&self) -> CarbonConfidence;

    fn shift_savings(&self) -> ShiftSavings;
}

/// Share of the daily standard deviation assumed recoverable by shifting.
const VARIABILITY_SHARE: f64 = 0.15;

/// Scaling of the base saving per shift duration.
const DURATION_MULTIPLIERS: [(u32, f64); 4] = [(1, 0.5), (2, 0.75), (4, 1.0), (8, 1.2)];

/// Estimates savings from the coefficient of variation of a daily series.
#[derive(Debug, Clone, Copy)]
pub struct VariabilityEstimator {
    avg: f64,
    std_dev: f64,
}

impl VariabilityEstimator {
    pub fn new(stats: &SeriesStats) -> Self {
        Self {
            avg: stats.avg,
            std_dev: stats.std_dev,
        }
    }

    fn base_saving(&self) -> f64 {
        let variability = if self.avg == 0.0 {
            0.0
        } else {
            self.std_dev / self.avg
        };
        self.avg * variability * VARIABILITY_SHARE
    }
}

impl ShiftSavingsEstimator for VariabilityEstimator {
    fn confidence(&self) -> CarbonConfidence {
        CarbonConfidence::Measured
    }

    fn shift_savings(&self) -> ShiftSavings {
        let base = self.base_saving();
        DURATION_MULTIPLIERS
            .iter()
            .map(|&(hours, multiplier)| (hours, round_whole(base * multiplier).max(0)))
            .collect()
    }
}

/// Simulates moving demand from each hour `h` to `h + d` against an hourly profile.
#[derive(Debug, Clone, Copy)]
pub struct ProfileShiftEstimator<'a> {
    profile: &'a [i64; HOURS_PER_DAY],
}

impl<'a> ProfileShiftEstimator<'a> {
    pub fn new(profile: &'a [i64; HOURS_PER_DAY]) -> Self {
        Self { profile }
    }

    /// Mean of the positive savings at `shift` hours, or 0 when no hour benefits.
    fn average_positive_saving(&self, shift: u32) -> i64 {
        let mut total = 0i64;
        let mut count = 0i64;

        for hour in 0..HOURS_PER_DAY {
            let shifted = (hour + shift as usize) % HOURS_PER_DAY;
            let saving = self.profile[hour] - self.profile[shifted];
            if saving > 0 {
                total += saving;
                count += 1;
            }
        }

        if count == 0 {
            0
        } else {
            round_whole(total as f64 / count as f64)
        }
    }
}

impl ShiftSavingsEstimator for ProfileShiftEstimator<'_> {
    fn confidence(&self) -> CarbonConfidence {
        CarbonConfidence::Detailed
    }

    fn shift_savings(&self) -> ShiftSavings {
        SHIFT_DURATIONS
            .iter()
            .map(|&hours| (hours, self.average_positive_saving(hours)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(avg: f64, std_dev: f64) -> SeriesStats {
        SeriesStats {
            avg,
            min: 0.0,
            max: 0.0,
            median: 0.0,
            std_dev,
        }
    }

    #[test]
    fn test_variability_estimator_multipliers() {
        // base = 400 * (80 / 400) * 0.15 = 12
        let savings = VariabilityEstimator::new(&stats(400.0, 80.0)).shift_savings();

        assert_eq!(savings.keys().copied().collect::<Vec<_>>(), SHIFT_DURATIONS);
        assert_eq!(savings[&1], 6);
        assert_eq!(savings[&2], 9);
        assert_eq!(savings[&4], 12);
        assert_eq!(savings[&8], 14);
    }

    #[test]
    fn test_variability_estimator_zero_average() {
        let savings = VariabilityEstimator::new(&stats(0.0, 0.0)).shift_savings();
        assert!(savings.values().all(|&v| v == 0));
        assert_eq!(savings.len(), 4);
    }

    #[test]
    fn test_variability_estimator_is_measured() {
        let estimator = VariabilityEstimator::new(&stats(1.0, 1.0));
        assert_eq!(estimator.confidence().label(), "measured");
    }

    #[test]
    fn test_profile_estimator_constant_profile_has_no_savings() {
        let profile = [10; 24];
        let savings = ProfileShiftEstimator::new(&profile).shift_savings();

        assert_eq!(savings.keys().copied().collect::<Vec<_>>(), SHIFT_DURATIONS);
        assert!(savings.values().all(|&v| v == 0));
    }

    #[test]
    fn test_profile_estimator_peak_profile() {
        let mut profile = [50; 24];
        for value in &mut profile[8..20] {
            *value = 100;
        }
        let estimator = ProfileShiftEstimator::new(&profile);
        let savings = estimator.shift_savings();

        // Every positive pair moves a 100 hour into a 50 hour.
        for hours in SHIFT_DURATIONS {
            assert_eq!(savings[&hours], 50, "shift of {hours}h");
        }
        assert_eq!(estimator.confidence(), CarbonConfidence::Detailed);
    }

    #[test]
    fn test_profile_estimator_averages_only_positive_savings() {
        let mut profile = [0; 24];
        profile[0] = 30;
        profile[1] = 10;
        // shift 1: hour 0 saves 20, hour 1 saves 10, hour 23 loses 30
        let savings = ProfileShiftEstimator::new(&profile).shift_savings();
        assert_eq!(savings[&1], 15);
    }
}
