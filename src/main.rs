//! CLI entry point for the flexgrid data pipeline.
//!
//! Provides subcommands for turning the source CSV exports into the dashboard
//! documents, and for checking the flexibility calculator against them.

use anyhow::Result;
use clap::{Parser, Subcommand};
use flexgrid::calculator::{calculate, find_country, load_country_document};
use flexgrid::output::print_json;
use flexgrid::pipeline::{PipelineInputs, run_and_emit};
use flexgrid::reference::ReferenceTables;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "flexgrid")]
#[command(about = "Summarize electricity price and carbon data for the flexibility dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process the source CSVs into the dashboard JSON documents
    Process {
        /// Hourly wholesale price CSV
        #[arg(long, env = "FLEXGRID_PRICES", default_value = "data/all_countries.csv")]
        prices: PathBuf,

        /// Daily carbon-intensity CSV
        #[arg(long, env = "FLEXGRID_DAILY_CARBON", default_value = "data/ECON-PowerCI_2015_2024.csv")]
        daily_carbon: PathBuf,

        /// Half-hourly carbon-intensity and generation-mix CSV
        #[arg(long, env = "FLEXGRID_DETAILED_CARBON", default_value = "data/df_fuel_ckan.csv")]
        detailed_carbon: PathBuf,

        /// Directory to write the JSON documents to
        #[arg(short, long, env = "FLEXGRID_OUTPUT_DIR", default_value = "output")]
        output_dir: PathBuf,

        /// Optional: JSON file overriding the built-in reference tables
        #[arg(long, env = "FLEXGRID_REFERENCE")]
        reference: Option<PathBuf>,

        /// Optional: also write gzip-compressed copies of the documents
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Value a demand shift for one country of an emitted country document
    Calculate {
        /// Country document written by `process`
        #[arg(short, long, default_value = "output/european-data.json")]
        data: PathBuf,

        /// Country name (map aliases such as "UK" are accepted)
        #[arg(short, long)]
        country: String,

        /// Demand to shift, in GWh
        #[arg(long, default_value_t = 100.0)]
        demand_gwh: f64,

        /// Shift duration in hours (1, 2, 4 or 8)
        #[arg(short, long, default_value_t = 4)]
        shift_hours: u32,

        /// Optional: JSON file overriding the built-in reference tables
        #[arg(long, env = "FLEXGRID_REFERENCE")]
        reference: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/flexgrid.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("flexgrid.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("info")));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::try_from_env("RUST_LOG_JSON").unwrap_or_else(|_| EnvFilter::new("debug")));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            prices,
            daily_carbon,
            detailed_carbon,
            output_dir,
            reference,
            gzip,
        } => {
            let reference = ReferenceTables::load(reference.as_deref())?;
            let inputs = PipelineInputs {
                prices,
                daily_carbon,
                detailed_carbon,
            };

            info!("Starting data processing");
            let emitted = run_and_emit(&inputs, &reference, &output_dir, gzip)?;
            for path in &emitted.compressed {
                info!(path = %path.display(), "Compressed copy");
            }
        }
        Commands::Calculate {
            data,
            country,
            demand_gwh,
            shift_hours,
            reference,
        } => {
            let reference = ReferenceTables::load(reference.as_deref())?;
            let document = load_country_document(&data)?;
            let record = find_country(&document, &country, &reference.map_aliases)?;
            let result = calculate(record, demand_gwh, shift_hours)?;

            print_json(&result)?;
        }
    }

    Ok(())
}
