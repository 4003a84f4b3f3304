//! Struktura Core - fixed-weight portfolio valuation and benchmark comparison.
//!
//! This crate provides the computational core of Struktura Lab:
//!
//! - **Price series builder**: aligned, forward-filled price panels and
//!   normalized, weighted portfolio value series
//! - **Performance metrics**: annualized return, volatility, Sharpe ratio,
//!   max drawdown, best/worst calendar year, correlation to a benchmark
//! - **Data loading**: quote tables and instrument catalogs from CSV
//!
//! # Example
//!
//! ```rust,no_run
//! use struktura_core::data::QuoteTable;
//! use struktura_core::portfolio::{analyze, AnalysisRequest, GapPolicy};
//!
//! let quotes = QuoteTable::from_path("notowania.csv")?;
//! let request: AnalysisRequest =
//!     serde_json::from_str(&std::fs::read_to_string("request.json")?)?;
//!
//! let report = analyze(&quotes, &request, GapPolicy::default())?;
//! println!("Portfolio 1 Sharpe: {:.2}", report.portfolio_1.metrics.sharpe);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod data;
pub mod format;
pub mod portfolio;
pub mod types;

// Re-export commonly used types
pub use types::{
    ApiResponse, DataGap, DateRange, MetricsRow, Quote, ReturnSeries, SeriesPoint, ValueSeries,
};

// Re-export main functionality
pub use config::Settings;
pub use data::{InstrumentCatalog, QuoteTable};
pub use portfolio::{
    analyze, build_value_series, compute_metrics, AnalysisReport, AnalysisRequest, GapPolicy,
    PortfolioSpec, PricePanel,
};

/// Reasons a request is rejected before any computation runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("no instruments selected for {0}")]
    EmptySelection(String),

    #[error("{portfolio} contains an instrument with a blank identifier")]
    EmptyInstrument { portfolio: String },

    #[error("{portfolio} lists {instrument} more than once")]
    DuplicateInstrument {
        portfolio: String,
        instrument: String,
    },

    #[error("weight for {instrument} in {portfolio} is {weight}%, must be between 0 and 100")]
    WeightOutOfRange {
        portfolio: String,
        instrument: String,
        weight: u32,
    },

    #[error("weights in {portfolio} sum to {total}%, must sum to 100%")]
    WeightSum { portfolio: String, total: u32 },

    #[error("no benchmark instrument selected")]
    MissingBenchmark,

    #[error("start date {start} is after end date {end}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("starting capital must be positive, got {0}")]
    NonPositiveCapital(f64),
}

/// Error types for struktura-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type for struktura-core operations.
pub type Result<T> = std::result::Result<T, Error>;
