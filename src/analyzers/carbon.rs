//! Carbon-intensity summaries for the daily and half-hourly sources.

use std::collections::{BTreeMap, BTreeSet};

use crate::analyzers::estimators::{ProfileShiftEstimator, ShiftSavingsEstimator, VariabilityEstimator};
use crate::analyzers::types::{
    CarbonStats, DailyCarbonSummary, DateRange, DetailedCarbonSummary, GenerationMix, PeakVsOffPeak,
};
use crate::analyzers::utility::{mean, round_to, round_whole};
use crate::grouping::{DetailedSeries, EntitySeries, FuelShares, Observation};
use crate::stats::{
    EmptyHour, PeakSplit, SeriesStats, YearKey, hourly_profile, trailing_mean, yearly_means,
};

/// Provenance label of the daily source.
pub const DAILY_SOURCE: &str = "ECON-PowerCI";

/// Provenance label of the half-hourly source.
pub const DETAILED_SOURCE: &str = "National Grid ESO (half-hourly)";

/// Observations averaged for the "current" value of a daily series.
pub const DAILY_CURRENT_WINDOW: usize = 30;

/// Observations averaged for the "current" value of a half-hourly series (one day).
pub const DETAILED_CURRENT_WINDOW: usize = 48;

/// Number of most recent years averaged into the generation mix.
const MIX_YEARS: usize = 2;

fn date_range(observations: &[Observation]) -> Option<DateRange> {
    Some(DateRange {
        start: observations.first()?.timestamp.clone(),
        end: observations.last()?.timestamp.clone(),
    })
}

fn yearly_trend(observations: &[Observation], key: YearKey) -> BTreeMap<String, i64> {
    yearly_means(observations, key)
        .into_iter()
        .map(|(year, avg)| (year, round_whole(avg)))
        .collect()
}

/// Summarizes one entity's daily carbon series. Returns `None` for an empty series.
pub fn summarize_daily_carbon(observations: &[Observation]) -> Option<DailyCarbonSummary> {
    let values: Vec<f64> = observations.iter().map(|o| o.value).collect();
    let stats = SeriesStats::from_values(&values)?;
    let estimator = VariabilityEstimator::new(&stats);

    Some(DailyCarbonSummary {
        record_count: values.len(),
        date_range: date_range(observations)?,
        carbon_stats: CarbonStats {
            avg: round_whole(stats.avg),
            min: round_whole(stats.min),
            max: round_whole(stats.max),
            current: round_whole(trailing_mean(&values, DAILY_CURRENT_WINDOW)),
            std_dev: Some(round_whole(stats.std_dev)),
        },
        yearly_trend: yearly_trend(observations, YearKey::BeforeSlash),
        shift_savings: estimator.shift_savings(),
        data_source: DAILY_SOURCE.to_string(),
    })
}

/// Summarizes every entity of the daily source.
pub fn summarize_all_daily_carbon(series: &EntitySeries) -> BTreeMap<String, DailyCarbonSummary> {
    series
        .iter()
        .filter_map(|(entity, observations)| {
            summarize_daily_carbon(observations).map(|s| (entity.clone(), s))
        })
        .collect()
}

/// Summarizes the half-hourly series. Returns `None` when it has no valid rows.
pub fn summarize_detailed_carbon(series: &DetailedSeries) -> Option<DetailedCarbonSummary> {
    let observations = &series.observations;
    let values: Vec<f64> = observations.iter().map(|o| o.value).collect();
    let stats = SeriesStats::from_values(&values)?;

    let profile = hourly_profile(observations, EmptyHour::Zero).map(round_whole);
    let split = PeakSplit::from_profile(&profile.map(|v| v as f64));
    let shift_savings = ProfileShiftEstimator::new(&profile).shift_savings();

    Some(DetailedCarbonSummary {
        record_count: values.len(),
        date_range: date_range(observations)?,
        carbon_stats: CarbonStats {
            avg: round_whole(stats.avg),
            min: round_whole(stats.min),
            max: round_whole(stats.max),
            current: round_whole(trailing_mean(&values, DETAILED_CURRENT_WINDOW)),
            std_dev: None,
        },
        hourly_profile: profile,
        peak_vs_off_peak: PeakVsOffPeak {
            peak_avg: round_whole(split.peak_avg),
            off_peak_avg: round_whole(split.off_peak_avg),
            difference: round_whole(split.spread()),
        },
        shift_savings,
        yearly_trend: yearly_trend(observations, YearKey::Prefix),
        generation_mix: generation_mix(series),
        data_source: DETAILED_SOURCE.to_string(),
    })
}

/// Average fuel shares over the most recent years present in the series.
fn generation_mix(series: &DetailedSeries) -> GenerationMix {
    let years: BTreeSet<&str> = series
        .observations
        .iter()
        .map(|o| YearKey::Prefix.extract(&o.timestamp))
        .collect();
    let recent: BTreeSet<&str> = years.into_iter().rev().take(MIX_YEARS).collect();

    let shares: Vec<&FuelShares> = series
        .observations
        .iter()
        .zip(&series.mix)
        .filter(|(obs, _)| recent.contains(YearKey::Prefix.extract(&obs.timestamp)))
        .map(|(_, mix)| mix)
        .collect();

    if shares.is_empty() {
        return GenerationMix::default();
    }

    let average = |fuel: fn(&FuelShares) -> f64| {
        let values: Vec<f64> = shares.iter().map(|s| fuel(s)).collect();
        round_to(mean(&values), 1)
    };

    GenerationMix {
        gas: average(|s| s.gas),
        coal: average(|s| s.coal),
        nuclear: average(|s| s.nuclear),
        wind: average(|s| s.wind),
        solar: average(|s| s.solar),
        hydro: average(|s| s.hydro),
        biomass: average(|s| s.biomass),
        imports: average(|s| s.imports),
        other: average(|s| s.other),
    }
}
