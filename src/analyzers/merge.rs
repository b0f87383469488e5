//! Attaches carbon summaries to price summaries.
//!
//! Daily estimates attach by country name. The half-hourly summary, when it
//! exists, replaces whatever the designated entity held before and is never
//! replaced afterwards.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::analyzers::types::{
    CarbonCoverage, CountryDocument, CountrySummary, DailyCarbonSummary, DetailedCarbonSummary,
    PriceSummary,
};

impl CountrySummary {
    pub fn new(price: PriceSummary) -> Self {
        Self {
            price,
            coverage: CarbonCoverage::Uncovered,
        }
    }

    /// Uncovered → Estimated. A detailed summary is kept.
    pub fn attach_estimated(&mut self, summary: DailyCarbonSummary) {
        if !self.coverage.has_detailed_carbon() {
            self.coverage = CarbonCoverage::Estimated(summary);
        }
    }

    /// Any state → Detailed.
    pub fn attach_detailed(&mut self, summary: DetailedCarbonSummary) {
        self.coverage = CarbonCoverage::Detailed(summary);
    }
}

/// Merges price summaries with the daily and (optional) half-hourly carbon
/// summaries into Document A.
pub fn merge_carbon(
    prices: BTreeMap<String, PriceSummary>,
    daily: BTreeMap<String, DailyCarbonSummary>,
    detailed: Option<(&str, DetailedCarbonSummary)>,
) -> CountryDocument {
    let mut document: CountryDocument = prices
        .into_iter()
        .map(|(country, price)| (country, CountrySummary::new(price)))
        .collect();

    let mut estimated = 0usize;
    for (country, summary) in daily {
        match document.get_mut(&country) {
            Some(entry) => {
                entry.attach_estimated(summary);
                estimated += 1;
            }
            None => debug!(country = %country, "Daily carbon data has no matching price data"),
        }
    }
    info!(countries = estimated, "Merged daily carbon data");

    if let Some((entity, summary)) = detailed {
        match document.get_mut(entity) {
            Some(entry) => {
                entry.attach_detailed(summary);
                info!(country = entity, "Enhanced with detailed half-hourly carbon data");
            }
            None => debug!(country = entity, "Detailed carbon entity has no price data"),
        }
    }

    document
}
