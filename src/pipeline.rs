//! End-to-end batch run: read the three sources, summarize, merge, emit.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};

use crate::analyzers::carbon::{summarize_all_daily_carbon, summarize_detailed_carbon};
use crate::analyzers::merge::merge_carbon;
use crate::analyzers::prices::summarize_all_prices;
use crate::analyzers::types::{CountryDocument, DetailedCarbonSummary};
use crate::grouping::{DAILY_CARBON_COLUMNS, PRICE_COLUMNS, detailed_series, group_by_entity};
use crate::output::{EmittedDocuments, emit_documents};
use crate::reader::Table;
use crate::reference::{AliasMap, ReferenceTables};

/// Input files of one run.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub prices: PathBuf,
    pub daily_carbon: PathBuf,
    pub detailed_carbon: PathBuf,
}

/// Both documents of one run, before they are written.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub countries: CountryDocument,
    pub detailed: Option<DetailedCarbonSummary>,
}

impl PipelineOutput {
    pub fn countries_with_carbon(&self) -> usize {
        self.countries
            .values()
            .filter(|c| c.coverage.has_carbon_data())
            .count()
    }
}

/// Summarizes already-parsed source tables.
pub fn summarize_tables(
    prices: &Table,
    daily_carbon: &Table,
    detailed_carbon: &Table,
    reference: &ReferenceTables,
) -> PipelineOutput {
    let price_series = group_by_entity(prices, PRICE_COLUMNS, &AliasMap::identity());
    let price_summaries = summarize_all_prices(&price_series, reference);
    info!(countries = price_summaries.len(), "Processed price data");

    let daily_series = group_by_entity(daily_carbon, DAILY_CARBON_COLUMNS, &reference.daily_carbon_aliases);
    let daily_summaries = summarize_all_daily_carbon(&daily_series);
    info!(countries = daily_summaries.len(), "Processed daily carbon data");

    let detailed = summarize_detailed_carbon(&detailed_series(detailed_carbon));
    match &detailed {
        Some(summary) => info!(records = summary.record_count, "Processed half-hourly carbon data"),
        None => warn!("Half-hourly carbon source has no valid rows; no detailed carbon data"),
    }

    let countries = merge_carbon(
        price_summaries,
        daily_summaries,
        detailed
            .clone()
            .map(|summary| (reference.detailed_entity.as_str(), summary)),
    );

    PipelineOutput { countries, detailed }
}

/// Reads every input file, failing on the first one that cannot be read.
#[tracing::instrument(skip(reference))]
pub fn run(inputs: &PipelineInputs, reference: &ReferenceTables) -> Result<PipelineOutput> {
    let prices = Table::read(&inputs.prices)?;
    let daily_carbon = Table::read(&inputs.daily_carbon)?;
    let detailed_carbon = Table::read(&inputs.detailed_carbon)?;

    Ok(summarize_tables(&prices, &daily_carbon, &detailed_carbon, reference))
}

/// Runs the pipeline and writes both documents into `output_dir`.
pub fn run_and_emit(
    inputs: &PipelineInputs,
    reference: &ReferenceTables,
    output_dir: &Path,
    gzip: bool,
) -> Result<EmittedDocuments> {
    let output = run(inputs, reference)?;
    let emitted = emit_documents(output_dir, &output.countries, output.detailed.as_ref(), gzip)?;

    info!(
        countries = output.countries.len(),
        with_carbon = output.countries_with_carbon(),
        detailed_records = output.detailed.as_ref().map_or(0, |d| d.record_count),
        country_document = %emitted.country_document.display(),
        detailed_document = ?emitted.detailed_document,
        "Data processing complete"
    );
    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRICES: &str = "Country,Datetime (UTC),Price (EUR/MWhe)\n\
        United Kingdom,2024-01-01 09:00:00,100\n\
        United Kingdom,2024-01-01 02:00:00,40\n\
        Czechia,2024-01-01 09:00:00,90\n";

    const DAILY: &str = "Country Name,Timestamp,Value,FLAG\n\
        United Kingdom,2024/01/01,250,\n\
        Czech Republic,2024/01/01,450,\n";

    const DETAILED: &str = "DATETIME,CARBON_INTENSITY,GAS_perc\n\
        2024-01-01T09:00:00,200,40\n\
        2024-01-01T02:00:00,120,20\n";

    #[test]
    fn test_summarize_tables_merges_all_sources() {
        let output = summarize_tables(
            &Table::parse(PRICES).unwrap(),
            &Table::parse(DAILY).unwrap(),
            &Table::parse(DETAILED).unwrap(),
            &ReferenceTables::default(),
        );

        assert_eq!(output.countries.len(), 2);
        assert_eq!(output.countries_with_carbon(), 2);
        assert!(output.countries["United Kingdom"].coverage.has_detailed_carbon());
        assert!(!output.countries["Czechia"].coverage.has_detailed_carbon());
        assert!(output.detailed.is_some());
    }

    #[test]
    fn test_empty_detailed_source_is_not_fatal() {
        let output = summarize_tables(
            &Table::parse(PRICES).unwrap(),
            &Table::parse(DAILY).unwrap(),
            &Table::parse("DATETIME,CARBON_INTENSITY\n").unwrap(),
            &ReferenceTables::default(),
        );

        assert!(output.detailed.is_none());
        let uk = &output.countries["United Kingdom"];
        assert!(uk.coverage.has_carbon_data());
        assert!(!uk.coverage.has_detailed_carbon());
    }

    #[test]
    fn test_missing_input_file_is_fatal() {
        let inputs = PipelineInputs {
            prices: PathBuf::from("/nonexistent/prices.csv"),
            daily_carbon: PathBuf::from("/nonexistent/daily.csv"),
            detailed_carbon: PathBuf::from("/nonexistent/detailed.csv"),
        };

        let err = run(&inputs, &ReferenceTables::default()).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/prices.csv"));
    }
}
