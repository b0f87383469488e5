//! Output shapes of the summarization pipeline.
//!
//! Field order here is the key order of the emitted documents.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::analyzers::utility::Rounded;
use crate::stats::HOURS_PER_DAY;

/// Estimated carbon-intensity reduction (g CO₂/kWh) per shift duration in hours.
pub type ShiftSavings = BTreeMap<u32, i64>;

/// Price distribution in EUR/MWh.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceStats {
    pub avg: Rounded,
    pub min: Rounded,
    pub max: Rounded,
    pub median: Rounded,
    pub std_dev: Rounded,
}

/// Peak/off-peak price profile; `spread_eur_per_mwh` is the headline flexibility value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Flexibility {
    pub peak_avg: Rounded,
    pub off_peak_avg: Rounded,
    #[serde(rename = "spreadEurPerMWh")]
    pub spread_eur_per_mwh: Rounded,
    pub hourly_profile: [Rounded; HOURS_PER_DAY],
}

/// Per-country wholesale price summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSummary {
    pub name: String,
    pub iso3: String,
    pub iso2: String,
    pub record_count: usize,
    pub price_stats: PriceStats,
    pub flexibility: Flexibility,
    pub yearly_average: BTreeMap<String, Rounded>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Carbon intensity distribution in g CO₂/kWh, rounded to whole numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonStats {
    pub avg: i64,
    pub min: i64,
    pub max: i64,
    /// Mean of roughly the last day of observations.
    pub current: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<i64>,
}

/// Carbon summary built from one value per day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCarbonSummary {
    pub record_count: usize,
    pub date_range: DateRange,
    pub carbon_stats: CarbonStats,
    pub yearly_trend: BTreeMap<String, i64>,
    pub shift_savings: ShiftSavings,
    pub data_source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakVsOffPeak {
    pub peak_avg: i64,
    pub off_peak_avg: i64,
    pub difference: i64,
}

/// Average generation share per fuel type, in percent (1 decimal).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GenerationMix {
    pub gas: Rounded,
    pub coal: Rounded,
    pub nuclear: Rounded,
    pub wind: Rounded,
    pub solar: Rounded,
    pub hydro: Rounded,
    pub biomass: Rounded,
    pub imports: Rounded,
    pub other: Rounded,
}

/// Carbon summary built from half-hourly data with a real intra-day profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedCarbonSummary {
    pub record_count: usize,
    pub date_range: DateRange,
    pub carbon_stats: CarbonStats,
    pub hourly_profile: [i64; HOURS_PER_DAY],
    pub peak_vs_off_peak: PeakVsOffPeak,
    pub shift_savings: ShiftSavings,
    pub yearly_trend: BTreeMap<String, i64>,
    pub generation_mix: GenerationMix,
    pub data_source: String,
}

/// Which carbon source, if any, backs a country's figures.
///
/// A country holds at most one carbon summary; `Detailed` can only be reached
/// from half-hourly data and is never replaced by a daily estimate.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CarbonCoverage {
    #[default]
    Uncovered,
    Estimated(DailyCarbonSummary),
    Detailed(DetailedCarbonSummary),
}

impl CarbonCoverage {
    pub fn has_carbon_data(&self) -> bool {
        !matches!(self, CarbonCoverage::Uncovered)
    }

    pub fn has_detailed_carbon(&self) -> bool {
        matches!(self, CarbonCoverage::Detailed(_))
    }
}

/// A country's price summary together with its carbon coverage.
#[derive(Debug, Clone, PartialEq)]
pub struct CountrySummary {
    pub price: PriceSummary,
    pub coverage: CarbonCoverage,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CountryRecord<'a> {
    #[serde(flatten)]
    price: &'a PriceSummary,
    has_detailed_carbon: bool,
    has_carbon_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    carbon_data: Option<CarbonRef<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum CarbonRef<'a> {
    Daily(&'a DailyCarbonSummary),
    Detailed(&'a DetailedCarbonSummary),
}

impl Serialize for CountrySummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let carbon_data = match &self.coverage {
            CarbonCoverage::Uncovered => None,
            CarbonCoverage::Estimated(s) => Some(CarbonRef::Daily(s)),
            CarbonCoverage::Detailed(s) => Some(CarbonRef::Detailed(s)),
        };

        CountryRecord {
            price: &self.price,
            has_detailed_carbon: self.coverage.has_detailed_carbon(),
            has_carbon_data: self.coverage.has_carbon_data(),
            carbon_data,
        }
        .serialize(serializer)
    }
}

/// Document A: every country with price data, keyed by canonical name.
pub type CountryDocument = BTreeMap<String, CountrySummary>;
