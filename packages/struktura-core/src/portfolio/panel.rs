//! Date x instrument price panels.
//!
//! A panel is built from raw quotes and then pushed through a sequence of
//! pure stages, each returning a new panel:
//!
//! 1. [`PricePanel::from_quotes`]: filter, dedupe, pivot
//! 2. [`PricePanel::forward_fill`]: carry the last known price forward
//! 3. [`PricePanel::normalize`]: rescale every column to 1.0 at the first date
//! 4. [`PricePanel::weighted`]: scale columns by portfolio weight
//! 5. [`PricePanel::row_sums`]: collapse to one value per date

use crate::portfolio::PortfolioSpec;
use crate::types::{DataGap, DateRange, Quote};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// How a missing cell is treated when summing a panel row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum GapPolicy {
    /// A missing cell makes the whole row NaN.
    #[default]
    Propagate,
    /// A missing cell contributes nothing to the row.
    Skip,
}

/// Prices indexed by date (ascending) with one column per instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePanel {
    dates: Vec<NaiveDate>,
    instruments: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

impl PricePanel {
    /// Pivot quotes into a panel.
    ///
    /// Only quotes for `instruments` inside `range` are kept. When a
    /// `(date, instrument)` pair occurs more than once, the first one in
    /// table order wins. The date index is the union of dates seen for the
    /// selected instruments; an instrument without any matching quote still
    /// gets an (empty) column.
    pub fn from_quotes(quotes: &[Quote], instruments: &[&str], range: DateRange) -> Self {
        let columns: HashMap<&str, usize> = instruments
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, i))
            .collect();

        let mut by_date: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
        for quote in quotes {
            if !range.contains(quote.date) {
                continue;
            }
            let Some(&col) = columns.get(quote.instrument.as_str()) else {
                continue;
            };
            let row = by_date
                .entry(quote.date)
                .or_insert_with(|| vec![None; instruments.len()]);
            if row[col].is_none() {
                row[col] = Some(quote.close);
            }
        }

        let (dates, rows) = by_date.into_iter().unzip();
        Self {
            dates,
            instruments: instruments.iter().map(|s| s.to_string()).collect(),
            rows,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    /// Number of dates.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Cell value for a date index and instrument.
    pub fn get(&self, row: usize, instrument: &str) -> Option<f64> {
        let col = self.column_index(instrument)?;
        self.rows.get(row).and_then(|r| r[col])
    }

    /// A full column, top to bottom.
    pub fn column(&self, instrument: &str) -> Option<Vec<Option<f64>>> {
        let col = self.column_index(instrument)?;
        Some(self.rows.iter().map(|r| r[col]).collect())
    }

    fn column_index(&self, instrument: &str) -> Option<usize> {
        self.instruments.iter().position(|i| i == instrument)
    }

    /// Instruments whose contribution cannot be valued from the first date.
    ///
    /// Call this on the panel returned by [`PricePanel::from_quotes`]; after
    /// forward fill the first quote date can no longer be recovered.
    pub fn gaps(&self) -> Vec<DataGap> {
        let mut gaps = Vec::new();
        for (col, instrument) in self.instruments.iter().enumerate() {
            let first_quote = self
                .rows
                .iter()
                .position(|r| r[col].is_some())
                .map(|i| self.dates[i]);

            match first_quote {
                None => gaps.push(DataGap::NoQuotesInRange {
                    instrument: instrument.clone(),
                }),
                Some(first) if first != self.dates[0] => gaps.push(DataGap::MissingAtStart {
                    instrument: instrument.clone(),
                    panel_start: self.dates[0],
                    first_quote: first,
                }),
                Some(_) => {}
            }
        }
        gaps
    }

    /// Fill each missing cell with the most recent known price above it.
    ///
    /// Cells before an instrument's first quote stay missing.
    pub fn forward_fill(&self) -> Self {
        let mut rows = self.rows.clone();
        for col in 0..self.instruments.len() {
            let mut last = None;
            for row in rows.iter_mut() {
                if row[col].is_some() {
                    last = row[col];
                } else {
                    row[col] = last;
                }
            }
        }
        self.with_rows(rows)
    }

    /// Divide every column by its value on the first panel date.
    ///
    /// A column missing on the first date has no base and becomes entirely
    /// missing, even where later prices exist.
    pub fn normalize(&self) -> Self {
        let Some(first) = self.rows.first() else {
            return self.clone();
        };
        let bases = first.clone();

        let rows: Vec<Vec<Option<f64>>> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&bases)
                    .map(|(cell, base)| match (cell, base) {
                        (Some(v), Some(b)) => Some(v / b),
                        _ => None,
                    })
                    .collect()
            })
            .collect();
        self.with_rows(rows)
    }

    /// Multiply each column by its weight fraction in `spec`.
    ///
    /// Columns for instruments not in `spec` get weight zero.
    pub fn weighted(&self, spec: &PortfolioSpec) -> Self {
        let fractions: Vec<f64> = self
            .instruments
            .iter()
            .map(|i| spec.fraction_of(i).unwrap_or(0.0))
            .collect();

        let rows: Vec<Vec<Option<f64>>> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&fractions)
                    .map(|(cell, f)| cell.map(|v| v * f))
                    .collect()
            })
            .collect();
        self.with_rows(rows)
    }

    /// Sum each row across instruments.
    pub fn row_sums(&self, policy: GapPolicy) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| match policy {
                GapPolicy::Propagate => row.iter().map(|c| c.unwrap_or(f64::NAN)).sum::<f64>(),
                GapPolicy::Skip => row.iter().flatten().sum::<f64>(),
            })
            .collect()
    }

    fn with_rows(&self, rows: Vec<Vec<Option<f64>>>) -> Self {
        Self {
            dates: self.dates.clone(),
            instruments: self.instruments.clone(),
            rows,
        }
    }
}
