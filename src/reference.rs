//! Static reference tables: country-name aliases and ISO metadata.
//!
//! Built-in defaults cover the European bidding zones in the price export. A
//! JSON file with the same shape may replace individual sections:
//! ```json
//! {
//!   "dailyCarbonAliases": { "Czech Republic": "Czechia" },
//!   "mapAliases": { "UK": "United Kingdom" },
//!   "countries": { "Czechia": { "iso3": "CZE", "iso2": "CZ" } },
//!   "detailedEntity": "United Kingdom"
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

/// ISO codes for one canonical country name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CountryMeta {
    pub iso3: String,
    pub iso2: String,
}

/// Maps source-specific entity names onto canonical names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct AliasMap {
    entries: HashMap<String, String>,
}

impl AliasMap {
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }

    /// An alias map that leaves every name unchanged.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Returns the canonical name for `name` (itself when unmapped).
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.entries.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static DAILY_CARBON_ALIASES: &[(&str, &str)] = &[
    ("Czech Republic", "Czechia"),
    ("Bosnia and Herz.", "Bosnia and Herzegovina"),
];

static MAP_ALIASES: &[(&str, &str)] = &[
    ("Czech Republic", "Czechia"),
    ("Republic of Serbia", "Serbia"),
    ("The former Yugoslav Republic of Macedonia", "North Macedonia"),
    ("UK", "United Kingdom"),
    ("Great Britain", "United Kingdom"),
];

static COUNTRY_META: &[(&str, &str, &str)] = &[
    ("Austria", "AUT", "AT"),
    ("Belgium", "BEL", "BE"),
    ("Bulgaria", "BGR", "BG"),
    ("Croatia", "HRV", "HR"),
    ("Czechia", "CZE", "CZ"),
    ("Denmark", "DNK", "DK"),
    ("Estonia", "EST", "EE"),
    ("Finland", "FIN", "FI"),
    ("France", "FRA", "FR"),
    ("Germany", "DEU", "DE"),
    ("Greece", "GRC", "GR"),
    ("Hungary", "HUN", "HU"),
    ("Ireland", "IRL", "IE"),
    ("Italy", "ITA", "IT"),
    ("Latvia", "LVA", "LV"),
    ("Lithuania", "LTU", "LT"),
    ("Luxembourg", "LUX", "LU"),
    ("Montenegro", "MNE", "ME"),
    ("Netherlands", "NLD", "NL"),
    ("North Macedonia", "MKD", "MK"),
    ("Norway", "NOR", "NO"),
    ("Poland", "POL", "PL"),
    ("Portugal", "PRT", "PT"),
    ("Romania", "ROU", "RO"),
    ("Serbia", "SRB", "RS"),
    ("Slovakia", "SVK", "SK"),
    ("Slovenia", "SVN", "SI"),
    ("Spain", "ESP", "ES"),
    ("Sweden", "SWE", "SE"),
    ("Switzerland", "CHE", "CH"),
    ("United Kingdom", "GBR", "GB"),
    ("Georgia", "GEO", "GE"),
    ("Moldova", "MDA", "MD"),
    ("Kosovo", "XKX", "XK"),
    ("Bosnia and Herzegovina", "BIH", "BA"),
];

/// The entity that may receive half-hourly carbon data.
pub const DEFAULT_DETAILED_ENTITY: &str = "United Kingdom";

/// Immutable lookup tables loaded once per run.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    /// Aliases applied to the daily carbon source's `Country Name` column.
    pub daily_carbon_aliases: AliasMap,
    /// Aliases from map and user-facing names (e.g. "UK") to canonical names.
    pub map_aliases: AliasMap,
    countries: HashMap<String, CountryMeta>,
    /// Canonical name of the entity covered by the half-hourly source.
    pub detailed_entity: String,
}

/// On-disk override file. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ReferenceFile {
    daily_carbon_aliases: Option<AliasMap>,
    map_aliases: Option<AliasMap>,
    countries: Option<HashMap<String, CountryMeta>>,
    detailed_entity: Option<String>,
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self {
            daily_carbon_aliases: AliasMap::from_pairs(DAILY_CARBON_ALIASES),
            map_aliases: AliasMap::from_pairs(MAP_ALIASES),
            countries: COUNTRY_META
                .iter()
                .map(|(name, iso3, iso2)| {
                    (
                        name.to_string(),
                        CountryMeta {
                            iso3: iso3.to_string(),
                            iso2: iso2.to_string(),
                        },
                    )
                })
                .collect(),
            detailed_entity: DEFAULT_DETAILED_ENTITY.to_string(),
        }
    }
}

impl ReferenceTables {
    /// Loads the built-in tables, replacing any section named in the JSON file at `path`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut tables = Self::default();
        let Some(path) = path else {
            return Ok(tables);
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read reference tables '{}'", path.display()))?;
        let file: ReferenceFile = serde_json::from_str(&content)
            .with_context(|| format!("invalid reference tables '{}'", path.display()))?;

        if let Some(aliases) = file.daily_carbon_aliases {
            tables.daily_carbon_aliases = aliases;
        }
        if let Some(aliases) = file.map_aliases {
            tables.map_aliases = aliases;
        }
        if let Some(countries) = file.countries {
            tables.countries = countries;
        }
        if let Some(entity) = file.detailed_entity {
            tables.detailed_entity = entity;
        }

        info!(
            path = %path.display(),
            countries = tables.countries.len(),
            detailed_entity = %tables.detailed_entity,
            "Reference tables loaded"
        );
        Ok(tables)
    }

    /// ISO codes for `country`, or empty codes when the country is unmapped.
    pub fn country_meta(&self, country: &str) -> CountryMeta {
        self.countries.get(country).cloned().unwrap_or_default()
    }

    pub fn is_known_country(&self, country: &str) -> bool {
        self.countries.contains_key(country)
    }
}
