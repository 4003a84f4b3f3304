//! Struktura CLI - portfolio comparison from the command line.
//!
//! JSON goes to stdout wrapped in `ApiResponse`; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use struktura_core::{
    analyze, format::metrics_table, AnalysisRequest, ApiResponse, GapPolicy, InstrumentCatalog,
    QuoteTable, Settings,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "struktura")]
#[command(about = "Struktura Lab CLI - compare portfolios against a benchmark")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to STRUKTURA_CONFIG or ~/.struktura/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Value two portfolios and a benchmark and compare their metrics
    Analyze {
        /// Request JSON file
        #[arg(short, long)]
        request: PathBuf,
        /// Quote table CSV (overrides settings)
        #[arg(short, long)]
        quotes: Option<PathBuf>,
        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
        /// Treatment of instruments without a first-date price (overrides settings)
        #[arg(long, value_enum)]
        gap_policy: Option<GapPolicy>,
    },
    /// List catalog instruments
    Instruments {
        /// Instrument catalog CSV (overrides settings)
        #[arg(short, long)]
        catalog: Option<PathBuf>,
        /// Only this category
        #[arg(long)]
        category: Option<String>,
    },
    /// List instruments usable as benchmark
    Benchmarks {
        /// Instrument catalog CSV (overrides settings)
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
    /// Show effective settings
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

enum Output {
    Json(Value),
    Text(String),
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(Output::Json(data)) => {
            print_json(&ApiResponse::ok(data));
            ExitCode::SUCCESS
        }
        Ok(Output::Text(text)) => {
            print!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            print_json(&ApiResponse::<()>::err(format!("{:#}", e)));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Output> {
    let settings_path = cli.config.unwrap_or_else(Settings::default_path);
    let settings = Settings::load_from_path(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;

    match cli.command {
        Commands::Analyze {
            request,
            quotes,
            format,
            gap_policy,
        } => handle_analyze(&settings, &request, quotes, format, gap_policy),
        Commands::Instruments { catalog, category } => {
            let catalog = load_catalog(&settings, catalog)?;
            let listing: Value = match category {
                Some(category) => json!({
                    "category": category,
                    "instruments": catalog.instruments(&category),
                }),
                None => json!({ "catalog": catalog }),
            };
            Ok(Output::Json(listing))
        }
        Commands::Benchmarks { catalog } => {
            let catalog = load_catalog(&settings, catalog)?;
            Ok(Output::Json(json!({
                "category": settings.benchmark_category,
                "benchmarks": catalog.benchmarks(&settings.benchmark_category),
            })))
        }
        Commands::Config => Ok(Output::Json(json!({
            "path": settings_path,
            "settings": settings,
        }))),
    }
}

fn handle_analyze(
    settings: &Settings,
    request_path: &Path,
    quotes: Option<PathBuf>,
    format: OutputFormat,
    gap_policy: Option<GapPolicy>,
) -> Result<Output> {
    let request = load_request(request_path, settings)?;

    // Validate before paying for the quote table
    request.validate()?;

    let quotes_path = quotes.unwrap_or_else(|| settings.quotes_path.clone());
    let table = QuoteTable::from_path(&quotes_path)
        .with_context(|| format!("Failed to load quotes from {}", quotes_path.display()))?;

    let report = analyze(&table, &request, gap_policy.unwrap_or(settings.gap_policy))?;
    for column in report.columns() {
        for gap in &column.gaps {
            tracing::warn!(series = %column.name, "{}", gap);
        }
    }

    match format {
        OutputFormat::Json => Ok(Output::Json(serde_json::to_value(&report)?)),
        OutputFormat::Table => Ok(Output::Text(metrics_table(&report))),
    }
}

/// Read a request, filling omitted dates and capital from settings.
fn load_request(path: &Path, settings: &Settings) -> Result<AnalysisRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request {}", path.display()))?;
    let mut value: Value = serde_json::from_str(&content)?;

    if let Some(object) = value.as_object_mut() {
        object
            .entry("starting_capital")
            .or_insert_with(|| json!(settings.starting_capital));
        object
            .entry("start_date")
            .or_insert_with(|| json!(settings.start_date));
        object
            .entry("end_date")
            .or_insert_with(|| json!(chrono::Local::now().date_naive()));
    }

    serde_json::from_value(value).context("Malformed analysis request")
}

fn load_catalog(settings: &Settings, path: Option<PathBuf>) -> Result<InstrumentCatalog> {
    let path = path.unwrap_or_else(|| settings.catalog_path.clone());
    InstrumentCatalog::from_path(&path)
        .with_context(|| format!("Failed to load catalog from {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}
