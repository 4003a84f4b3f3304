//! Core data types for Struktura Lab.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// Read an `f64` that serializes as `null` when undefined back as NaN.
fn nan_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// One closing price for one instrument on one date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    /// Instrument identifier (as listed in the catalog)
    pub instrument: String,
    /// Trading date
    pub date: NaiveDate,
    /// Closing price, always positive
    pub close: f64,
    /// Catalog category, ignored by valuation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Quote {
    /// Create a quote without a category.
    pub fn new(instrument: &str, date: NaiveDate, close: f64) -> Self {
        Self {
            instrument: instrument.to_string(),
            date,
            close,
            category: None,
        }
    }

    /// Attach a catalog category.
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether `start <= end`.
    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A dated value, used for both value and return series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    #[serde(deserialize_with = "nan_if_null")]
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// An instrument whose contribution to a portfolio is undefined.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataGap {
    /// No quote at all inside the requested range.
    NoQuotesInRange { instrument: String },
    /// Quotes exist, but none on the first panel date, so there is no
    /// normalization base.
    MissingAtStart {
        instrument: String,
        panel_start: NaiveDate,
        first_quote: NaiveDate,
    },
}

impl DataGap {
    pub fn instrument(&self) -> &str {
        match self {
            Self::NoQuotesInRange { instrument } | Self::MissingAtStart { instrument, .. } => {
                instrument
            }
        }
    }
}

impl std::fmt::Display for DataGap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoQuotesInRange { instrument } => {
                write!(f, "{} has no quotes in the requested range", instrument)
            }
            Self::MissingAtStart {
                instrument,
                panel_start,
                first_quote,
            } => write!(
                f,
                "{} has no quote on {} (first quote {})",
                instrument, panel_start, first_quote
            ),
        }
    }
}

/// Portfolio value over time, in the currency of the starting capital.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ValueSeries {
    pub points: Vec<SeriesPoint>,
    /// Instruments whose contribution is undefined
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gaps: Vec<DataGap>,
}

impl ValueSeries {
    pub fn new(points: Vec<SeriesPoint>) -> Self {
        Self {
            points,
            gaps: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn has_gaps(&self) -> bool {
        !self.gaps.is_empty()
    }

    /// Simple period-over-period returns; the first row has no prior period
    /// and is dropped.
    pub fn returns(&self) -> ReturnSeries {
        let points = self
            .points
            .windows(2)
            .map(|w| SeriesPoint::new(w[1].date, w[1].value / w[0].value - 1.0))
            .collect();
        ReturnSeries { points }
    }
}

/// Daily simple returns keyed by date, ascending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ReturnSeries {
    pub points: Vec<SeriesPoint>,
}

impl ReturnSeries {
    pub fn new(points: Vec<SeriesPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// The seven comparison metrics for one series against a reference series.
///
/// Values are fractions (0.12 for 12%). Undefined values are NaN and
/// serialize as `null`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MetricsRow {
    /// Annualized mean daily return (simple, not compounded)
    #[serde(deserialize_with = "nan_if_null")]
    pub cagr: f64,
    /// Annualized standard deviation of daily returns
    #[serde(deserialize_with = "nan_if_null")]
    pub volatility: f64,
    /// cagr / volatility, zero when volatility is zero
    #[serde(deserialize_with = "nan_if_null")]
    pub sharpe: f64,
    /// Largest peak-to-trough fall of the growth factor, as a non-positive number
    #[serde(deserialize_with = "nan_if_null")]
    pub max_drawdown: f64,
    /// Best compounded calendar-year return
    #[serde(deserialize_with = "nan_if_null")]
    pub best_year: f64,
    /// Worst compounded calendar-year return
    #[serde(deserialize_with = "nan_if_null")]
    pub worst_year: f64,
    /// Pearson correlation with the reference returns on common dates
    #[serde(deserialize_with = "nan_if_null")]
    pub correlation: f64,
}

impl MetricsRow {
    /// A row with every field undefined.
    pub fn undefined() -> Self {
        Self {
            cagr: f64::NAN,
            volatility: f64::NAN,
            sharpe: f64::NAN,
            max_drawdown: f64::NAN,
            best_year: f64::NAN,
            worst_year: f64::NAN,
            correlation: f64::NAN,
        }
    }

    /// Fields in display order with their labels.
    pub fn labeled(&self) -> [(&'static str, f64); 7] {
        [
            ("CAGR", self.cagr),
            ("Volatility", self.volatility),
            ("Sharpe Ratio", self.sharpe),
            ("Max Drawdown", self.max_drawdown),
            ("Best Year", self.best_year),
            ("Worst Year", self.worst_year),
            ("Correlation", self.correlation),
        ]
    }
}

/// API response wrapper for the command line front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
