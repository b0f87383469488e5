//! Flexibility value calculator over an emitted country document.
//!
//! Answers "what is shifting `demand_gwh` of demand by `shift_hours` worth in
//! this country", in euros and avoided CO₂.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};

use crate::analyzers::estimators::{CarbonConfidence, SHIFT_DURATIONS};
use crate::analyzers::utility::round_whole;
use crate::reference::AliasMap;

/// Trees needed to absorb one tonne of CO₂ per year.
pub const TREES_PER_TONNE_CO2: f64 = 45.0;

/// Social cost of carbon, EUR per tonne.
pub const CO2_SOCIAL_COST_EUR: f64 = 100.0;

/// Saving assumed for a 4-hour shift when a country has no carbon data, g CO₂/kWh.
pub const FALLBACK_SAVING_G_PER_KWH: f64 = 35.0;

/// The fields of a Document A record the calculator needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryRecord {
    pub name: String,
    pub iso3: String,
    pub iso2: String,
    pub flexibility: FlexibilityRecord,
    pub has_detailed_carbon: bool,
    pub has_carbon_data: bool,
    #[serde(default)]
    pub carbon_data: Option<CarbonRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlexibilityRecord {
    #[serde(rename = "spreadEurPerMWh")]
    pub spread_eur_per_mwh: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonRecord {
    pub shift_savings: BTreeMap<u32, f64>,
    pub data_source: String,
}

/// Value of one demand shift.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexibilityCalculation {
    pub country: String,
    #[serde(rename = "demandGWh")]
    pub demand_gwh: f64,
    pub shift_hours: u32,
    pub economic_savings_eur: f64,
    pub co2_avoided_tonnes: f64,
    pub trees_equivalent: i64,
    pub social_value_eur: f64,
    pub total_value_eur: f64,
    pub carbon_method: &'static str,
}

/// Reads Document A as written by the pipeline.
pub fn load_country_document(path: &Path) -> Result<BTreeMap<String, CountryRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read country document '{}'", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid country document '{}'", path.display()))
}

/// Looks up `name` directly, then through the map-consumer aliases.
pub fn find_country<'a>(
    document: &'a BTreeMap<String, CountryRecord>,
    name: &str,
    aliases: &AliasMap,
) -> Result<&'a CountryRecord> {
    document
        .get(name)
        .or_else(|| document.get(aliases.canonical(name)))
        .with_context(|| format!("no price data for country '{name}'"))
}

/// Computes the economic and carbon value of shifting `demand_gwh` by `shift_hours`.
pub fn calculate(country: &CountryRecord, demand_gwh: f64, shift_hours: u32) -> Result<FlexibilityCalculation> {
    ensure!(
        demand_gwh.is_finite() && demand_gwh >= 0.0,
        "demand must be a non-negative number of GWh, got {demand_gwh}"
    );
    if !SHIFT_DURATIONS.contains(&shift_hours) {
        bail!("shift duration must be one of {SHIFT_DURATIONS:?} hours, got {shift_hours}");
    }

    let economic_savings_eur = demand_gwh * 1000.0 * country.flexibility.spread_eur_per_mwh;

    let (g_per_kwh, confidence) = match (&country.carbon_data, country.has_carbon_data) {
        (Some(carbon), true) => {
            let saving = carbon.shift_savings.get(&shift_hours).copied().unwrap_or(0.0);
            let confidence = if country.has_detailed_carbon {
                CarbonConfidence::Detailed
            } else {
                CarbonConfidence::Measured
            };
            (saving, confidence)
        }
        _ => (
            FALLBACK_SAVING_G_PER_KWH * f64::from(shift_hours) / 4.0,
            CarbonConfidence::Estimated,
        ),
    };

    // GWh * g/kWh = 1e6 kWh * g/kWh = tonnes
    let co2_avoided_tonnes = demand_gwh * g_per_kwh;
    let social_value_eur = co2_avoided_tonnes * CO2_SOCIAL_COST_EUR;

    Ok(FlexibilityCalculation {
        country: country.name.clone(),
        demand_gwh,
        shift_hours,
        economic_savings_eur,
        co2_avoided_tonnes,
        trees_equivalent: round_whole(co2_avoided_tonnes * TREES_PER_TONNE_CO2),
        social_value_eur,
        total_value_eur: economic_savings_eur + social_value_eur,
        carbon_method: confidence.label(),
    })
}
