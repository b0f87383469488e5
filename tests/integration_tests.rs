use flexgrid::calculator::{calculate, find_country, load_country_document};
use flexgrid::output::{COUNTRY_DOCUMENT, DETAILED_DOCUMENT};
use flexgrid::pipeline::{PipelineInputs, run, run_and_emit};
use flexgrid::reader::Table;
use flexgrid::reference::ReferenceTables;
use serde_json::Value;
use std::env;
use std::fs;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn inputs() -> PipelineInputs {
    PipelineInputs {
        prices: fixture("prices.csv"),
        daily_carbon: fixture("daily_carbon.csv"),
        detailed_carbon: fixture("detailed_carbon.csv"),
    }
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&dir); // clean up any prior run
    dir
}

fn read_json(path: &PathBuf) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_full_pipeline() {
    let dir = temp_dir("flexgrid_it_full_pipeline");
    let reference = ReferenceTables::default();

    let emitted = run_and_emit(&inputs(), &reference, &dir, false).unwrap();
    let countries = read_json(&emitted.country_document);
    let countries = countries.as_object().unwrap();

    let names: Vec<&str> = countries.keys().map(String::as_str).collect();
    assert_eq!(names, ["Czechia", "France", "Germany", "United Kingdom"]);

    for (name, country) in countries {
        let profile = country["flexibility"]["hourlyProfile"].as_array().unwrap();
        assert_eq!(profile.len(), 24, "{name}");
        assert!(profile.iter().all(|v| v.as_f64().unwrap().is_finite()), "{name}");

        // ISO codes are always present, empty only for unmapped countries.
        let iso3 = country["iso3"].as_str().unwrap();
        assert_eq!(reference.is_known_country(name), !iso3.is_empty(), "{name}");
        assert!(country["iso2"].is_string(), "{name}");

        if let Some(carbon) = country.get("carbonData") {
            let savings = carbon["shiftSavings"].as_object().unwrap();
            let keys: Vec<&str> = savings.keys().map(String::as_str).collect();
            assert_eq!(keys, ["1", "2", "4", "8"], "{name}");
            assert!(savings.values().all(|v| v.as_i64().unwrap() >= 0), "{name}");
        }
    }

    let germany = &countries["Germany"];
    assert_eq!(germany["recordCount"], 48);
    assert_eq!(germany["priceStats"]["avg"], 90);
    assert_eq!(germany["priceStats"]["median"], 120);
    assert_eq!(germany["priceStats"]["stdDev"], 30);
    assert_eq!(germany["flexibility"]["spreadEurPerMWh"], 60);
    assert_eq!(germany["yearlyAverage"]["2023"], 90);
    assert_eq!(germany["hasCarbonData"], true);
    assert_eq!(germany["hasDetailedCarbon"], false);
    assert_eq!(germany["carbonData"]["dataSource"], "ECON-PowerCI");

    assert_eq!(countries["France"]["flexibility"]["spreadEurPerMWh"], 20);
    assert_eq!(countries["France"]["hasCarbonData"], false);
    assert!(countries["France"].get("carbonData").is_none());

    assert_eq!(countries["Czechia"]["hasCarbonData"], true);
    assert_eq!(countries["Czechia"]["iso3"], "CZE");

    let uk = &countries["United Kingdom"];
    assert_eq!(uk["hasDetailedCarbon"], true);
    assert_eq!(uk["hasCarbonData"], true);
    assert_eq!(uk["carbonData"]["dataSource"], "National Grid ESO (half-hourly)");

    let detailed = read_json(emitted.detailed_document.as_ref().unwrap());
    assert_eq!(detailed, uk["carbonData"]);
    assert_eq!(detailed["recordCount"], 144);
    assert_eq!(detailed["carbonStats"]["current"], 200);
    assert_eq!(detailed["peakVsOffPeak"]["difference"], 100);
    assert_eq!(detailed["shiftSavings"]["4"], 100);
    assert_eq!(detailed["generationMix"]["wind"], 25);
    assert_eq!(detailed["dateRange"]["start"], "2023-06-01T00:00:00");
    assert!(detailed["carbonStats"].get("stdDev").is_none());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_pipeline_is_idempotent() {
    let first = temp_dir("flexgrid_it_idempotent_a");
    let second = temp_dir("flexgrid_it_idempotent_b");
    let reference = ReferenceTables::default();

    run_and_emit(&inputs(), &reference, &first, true).unwrap();
    run_and_emit(&inputs(), &reference, &second, true).unwrap();

    for name in [
        COUNTRY_DOCUMENT.to_string(),
        DETAILED_DOCUMENT.to_string(),
        format!("{COUNTRY_DOCUMENT}.gz"),
        format!("{DETAILED_DOCUMENT}.gz"),
    ] {
        let a = fs::read(first.join(&name)).unwrap();
        let b = fs::read(second.join(&name)).unwrap();
        assert_eq!(a, b, "{name} differs between runs");
    }

    fs::remove_dir_all(&first).unwrap();
    fs::remove_dir_all(&second).unwrap();
}

#[test]
fn test_malformed_row_is_ignored() {
    let prices = Table::parse(
        "Country,Datetime (UTC),Price (EUR/MWhe)\n\
         Spain,2024-01-01 10:00:00,42.5\n\
         Spain,2024-01-01 11:00:00,not-a-number\n",
    )
    .unwrap();
    let empty_daily = Table::parse("Country Name,Timestamp,Value,FLAG\n").unwrap();
    let empty_detailed = Table::parse("DATETIME,CARBON_INTENSITY\n").unwrap();

    let output = flexgrid::pipeline::summarize_tables(
        &prices,
        &empty_daily,
        &empty_detailed,
        &ReferenceTables::default(),
    );

    let spain = &output.countries["Spain"].price;
    assert_eq!(spain.record_count, 1);
    assert_eq!(spain.price_stats.avg.value(), 42.5);
    assert_eq!(spain.price_stats.max.value(), 42.5);
    assert!(output.detailed.is_none());
}

#[test]
fn test_calculator_over_emitted_document() {
    let dir = temp_dir("flexgrid_it_calculator");
    let reference = ReferenceTables::default();
    let emitted = run_and_emit(&inputs(), &reference, &dir, false).unwrap();

    let document = load_country_document(&emitted.country_document).unwrap();
    let uk = find_country(&document, "UK", &reference.map_aliases).unwrap();
    let result = calculate(uk, 10.0, 4).unwrap();

    assert_eq!(result.country, "United Kingdom");
    assert_eq!(result.carbon_method, "detailed");
    assert_eq!(result.economic_savings_eur, 600_000.0);
    assert_eq!(result.co2_avoided_tonnes, 1000.0);

    let france = find_country(&document, "France", &reference.map_aliases).unwrap();
    assert_eq!(calculate(france, 10.0, 4).unwrap().carbon_method, "estimated");

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_input_aborts_run() {
    let mut inputs = inputs();
    inputs.daily_carbon = fixture("does_not_exist.csv");

    let err = run(&inputs, &ReferenceTables::default()).unwrap_err();
    assert!(format!("{err:#}").contains("does_not_exist.csv"));
}
