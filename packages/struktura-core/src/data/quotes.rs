//! Historical quote table loaded from CSV.

use crate::types::{DateRange, Quote};
use crate::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One CSV row. Accepts the English headers and the GPW export headers.
#[derive(Debug, Deserialize)]
struct QuoteRecord {
    #[serde(alias = "Nazwa")]
    instrument: String,
    #[serde(alias = "Data")]
    date: String,
    #[serde(alias = "Kurs zamknięcia", deserialize_with = "csv::invalid_option")]
    close: Option<f64>,
    #[serde(default, alias = "Kategoria")]
    category: Option<String>,
}

/// Read-only snapshot of historical closing prices.
///
/// Rows are kept in file order, which decides which duplicate
/// `(instrument, date)` quote wins during valuation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteTable {
    quotes: Vec<Quote>,
}

impl QuoteTable {
    pub fn new(quotes: Vec<Quote>) -> Self {
        Self { quotes }
    }

    /// Load a quote table from a CSV file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let table = Self::from_reader(file)?;
        tracing::info!(path = %path.display(), quotes = table.len(), "Loaded quote table");
        Ok(table)
    }

    /// Load a quote table from any CSV source with a header row.
    ///
    /// Rows with a blank instrument or a blank, unparseable or non-positive
    /// close are skipped. The gap is forward-filled during valuation.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut quotes = Vec::new();
        for (index, result) in rdr.deserialize().enumerate() {
            // Header is line 1
            let line = index + 2;
            let record: QuoteRecord = result?;

            if record.instrument.is_empty() {
                tracing::warn!(line, "Skipping quote without instrument");
                continue;
            }
            let close = match record.close {
                Some(close) if close.is_finite() && close > 0.0 => close,
                Some(close) => {
                    tracing::warn!(
                        line,
                        instrument = %record.instrument,
                        close,
                        "Skipping quote with non-positive close"
                    );
                    continue;
                }
                None => {
                    tracing::warn!(
                        line,
                        instrument = %record.instrument,
                        "Skipping quote without close"
                    );
                    continue;
                }
            };

            let date = parse_date(&record.date).ok_or_else(|| {
                Error::InvalidData(format!("line {}: unparseable date '{}'", line, record.date))
            })?;

            quotes.push(Quote {
                instrument: record.instrument,
                date,
                close,
                category: record.category.filter(|c| !c.is_empty()),
            });
        }

        Ok(Self { quotes })
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn into_inner(self) -> Vec<Quote> {
        self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Distinct instrument identifiers, sorted.
    pub fn instruments(&self) -> BTreeSet<&str> {
        self.quotes.iter().map(|q| q.instrument.as_str()).collect()
    }

    /// Earliest and latest quote dates.
    pub fn date_span(&self) -> Option<DateRange> {
        let start = self.quotes.iter().map(|q| q.date).min()?;
        let end = self.quotes.iter().map(|q| q.date).max()?;
        Some(DateRange::new(start, end))
    }
}

/// Parse a plain date, discarding any time of day.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}
