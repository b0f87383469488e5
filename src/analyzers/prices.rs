//! Per-country wholesale price summaries.

use std::collections::BTreeMap;

use crate::analyzers::types::{Flexibility, PriceStats, PriceSummary};
use crate::analyzers::utility::round2;
use crate::grouping::{EntitySeries, Observation};
use crate::reference::ReferenceTables;
use crate::stats::{EmptyHour, PeakSplit, SeriesStats, YearKey, hourly_profile, yearly_means};

/// Summarizes one country's price series. Returns `None` for an empty series.
pub fn summarize_prices(
    country: &str,
    observations: &[Observation],
    reference: &ReferenceTables,
) -> Option<PriceSummary> {
    let values: Vec<f64> = observations.iter().map(|o| o.value).collect();
    let stats = SeriesStats::from_values(&values)?;

    let profile = hourly_profile(observations, EmptyHour::Fill(stats.avg));
    let split = PeakSplit::from_profile(&profile);
    let meta = reference.country_meta(country);

    Some(PriceSummary {
        name: country.to_string(),
        iso3: meta.iso3,
        iso2: meta.iso2,
        record_count: values.len(),
        price_stats: PriceStats {
            avg: round2(stats.avg),
            min: round2(stats.min),
            max: round2(stats.max),
            median: round2(stats.median),
            std_dev: round2(stats.std_dev),
        },
        flexibility: Flexibility {
            peak_avg: round2(split.peak_avg),
            off_peak_avg: round2(split.off_peak_avg),
            spread_eur_per_mwh: round2(split.spread()),
            hourly_profile: profile.map(round2),
        },
        yearly_average: yearly_means(observations, YearKey::Prefix)
            .into_iter()
            .map(|(year, avg)| (year, round2(avg)))
            .collect(),
    })
}

/// Summarizes every country, dropping those without a valid price.
pub fn summarize_all_prices(
    series: &EntitySeries,
    reference: &ReferenceTables,
) -> BTreeMap<String, PriceSummary> {
    series
        .iter()
        .filter_map(|(country, observations)| {
            summarize_prices(country, observations, reference).map(|s| (country.clone(), s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::utility::Rounded;

    fn hourly_day(values: impl Fn(usize) -> f64) -> Vec<Observation> {
        (0..24)
            .map(|h| Observation::new(format!("2024-05-01 {h:02}:00:00"), values(h)))
            .collect()
    }

    #[test]
    fn test_summarize_empty_series() {
        assert!(summarize_prices("Germany", &[], &ReferenceTables::default()).is_none());
    }

    #[test]
    fn test_summarize_uniform_day_has_zero_spread() {
        let summary = summarize_prices("Germany", &hourly_day(|_| 80.0), &ReferenceTables::default()).unwrap();

        assert_eq!(summary.iso3, "DEU");
        assert_eq!(summary.iso2, "DE");
        assert_eq!(summary.record_count, 24);
        assert_eq!(summary.flexibility.peak_avg, Rounded(80.0));
        assert_eq!(summary.flexibility.off_peak_avg, Rounded(80.0));
        assert_eq!(summary.flexibility.spread_eur_per_mwh, Rounded(0.0));
        assert_eq!(summary.price_stats.std_dev, Rounded(0.0));
    }

    #[test]
    fn test_summarize_peak_day() {
        let observations = hourly_day(|h| if (8..20).contains(&h) { 120.0 } else { 40.0 });
        let summary = summarize_prices("Atlantis", &observations, &ReferenceTables::default()).unwrap();

        assert_eq!(summary.iso3, "");
        assert_eq!(summary.iso2, "");
        assert_eq!(summary.price_stats.avg, Rounded(80.0));
        assert_eq!(summary.price_stats.median, Rounded(120.0));
        assert_eq!(summary.price_stats.std_dev, Rounded(40.0));
        assert_eq!(summary.flexibility.spread_eur_per_mwh, Rounded(80.0));
        assert_eq!(summary.flexibility.hourly_profile[9], Rounded(120.0));
        assert_eq!(summary.flexibility.hourly_profile[3], Rounded(40.0));
    }

    #[test]
    fn test_missing_hours_fall_back_to_average() {
        let observations = vec![
            Observation::new("2023-01-01 00:00:00", 10.0),
            Observation::new("2024-01-01 12:00:00", 30.0),
        ];
        let summary = summarize_prices("France", &observations, &ReferenceTables::default()).unwrap();

        assert_eq!(summary.flexibility.hourly_profile[0], Rounded(10.0));
        assert_eq!(summary.flexibility.hourly_profile[12], Rounded(30.0));
        assert_eq!(summary.flexibility.hourly_profile[5], Rounded(20.0));
        assert_eq!(summary.yearly_average.len(), 2);
        assert_eq!(summary.yearly_average["2023"], Rounded(10.0));
    }

    #[test]
    fn test_summarize_all_prices_keeps_names() {
        let mut series = EntitySeries::new();
        series.insert("Spain".into(), hourly_day(|_| 50.0));
        series.insert("Empty".into(), Vec::new());

        let summaries = summarize_all_prices(&series, &ReferenceTables::default());
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries["Spain"].name, "Spain");
    }
}
