//! Partitions source rows into per-entity observation series.
//!
//! Rows with a missing entity key, a re-parsed header line, or an unparseable
//! metric are dropped silently; only the kept/skipped totals are logged.

use std::collections::BTreeMap;

use tracing::debug;

use crate::reader::{RawRow, Table};
use crate::reference::AliasMap;

/// One timestamped value of a metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub timestamp: String,
    pub value: f64,
    /// Source quality flag, when the source carries one.
    pub flag: Option<String>,
}

impl Observation {
    pub fn new(timestamp: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            value,
            flag: None,
        }
    }
}

/// Observation series per canonical entity name, each in input row order.
pub type EntitySeries = BTreeMap<String, Vec<Observation>>;

/// Column layout of an entity-keyed source.
#[derive(Debug, Clone, Copy)]
pub struct SourceColumns<'a> {
    pub entity: &'a str,
    pub timestamp: &'a str,
    pub value: &'a str,
    pub flag: Option<&'a str>,
}

/// Hourly wholesale price export.
pub const PRICE_COLUMNS: SourceColumns<'static> = SourceColumns {
    entity: "Country",
    timestamp: "Datetime (UTC)",
    value: "Price (EUR/MWhe)",
    flag: None,
};

/// Daily carbon-intensity export.
pub const DAILY_CARBON_COLUMNS: SourceColumns<'static> = SourceColumns {
    entity: "Country Name",
    timestamp: "Timestamp",
    value: "Value",
    flag: Some("FLAG"),
};

/// Groups `table` rows by entity, mapping names through `aliases`.
pub fn group_by_entity(table: &Table, columns: SourceColumns<'_>, aliases: &AliasMap) -> EntitySeries {
    let mut series = EntitySeries::new();
    let mut skipped = 0usize;

    for row in table.rows() {
        match observation_from_row(&row, columns) {
            Some((entity, obs)) => series
                .entry(aliases.canonical(entity).to_string())
                .or_default()
                .push(obs),
            None => skipped += 1,
        }
    }

    debug!(
        entity_column = columns.entity,
        entities = series.len(),
        kept = table.len() - skipped,
        skipped,
        "Rows grouped by entity"
    );
    series
}

fn observation_from_row<'a>(row: &RawRow<'a>, columns: SourceColumns<'_>) -> Option<(&'a str, Observation)> {
    let entity = row.get(columns.entity).filter(|name| !name.is_empty())?;
    if entity == columns.entity {
        return None;
    }

    let value = row.number(columns.value)?;
    let obs = Observation {
        timestamp: row.get(columns.timestamp).unwrap_or_default().to_string(),
        value,
        flag: columns
            .flag
            .and_then(|column| row.get(column))
            .map(str::to_string),
    };
    Some((entity, obs))
}

/// Fuel shares of generation, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FuelShares {
    pub gas: f64,
    pub coal: f64,
    pub nuclear: f64,
    pub wind: f64,
    pub solar: f64,
    pub hydro: f64,
    pub biomass: f64,
    pub imports: f64,
    pub other: f64,
}

impl FuelShares {
    /// Reads the `*_perc` columns; unreadable shares count as 0 and embedded
    /// wind is folded into wind.
    fn from_row(row: &RawRow<'_>) -> Self {
        let share = |column: &str| row.number(column).unwrap_or(0.0);
        Self {
            gas: share("GAS_perc"),
            coal: share("COAL_perc"),
            nuclear: share("NUCLEAR_perc"),
            wind: share("WIND_perc") + share("WIND_EMB_perc"),
            solar: share("SOLAR_perc"),
            hydro: share("HYDRO_perc"),
            biomass: share("BIOMASS_perc"),
            imports: share("IMPORTS_perc"),
            other: share("OTHER_perc"),
        }
    }
}

/// The half-hourly carbon source: intensity observations with the fuel mix of
/// the same settlement period at the same index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailedSeries {
    pub observations: Vec<Observation>,
    pub mix: Vec<FuelShares>,
}

impl DetailedSeries {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Parses the half-hourly carbon source, keeping rows with a numeric intensity.
pub fn detailed_series(table: &Table) -> DetailedSeries {
    let mut series = DetailedSeries::default();

    for row in table.rows() {
        let Some(intensity) = row.number("CARBON_INTENSITY") else {
            continue;
        };
        series
            .observations
            .push(Observation::new(row.get("DATETIME").unwrap_or_default(), intensity));
        series.mix.push(FuelShares::from_row(&row));
    }

    debug!(
        kept = series.len(),
        skipped = table.len() - series.len(),
        "Half-hourly carbon rows parsed"
    );
    series
}
