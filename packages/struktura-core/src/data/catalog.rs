//! Instrument catalog grouped by category.
//!
//! Categories only drive selection (e.g. which instruments may serve as a
//! benchmark); valuation never looks at them.

use crate::data::QuoteTable;
use crate::Result;
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CatalogRecord {
    #[serde(default, alias = "Kategoria")]
    category: Option<String>,
    #[serde(default, alias = "Nazwa")]
    name: Option<String>,
}

/// Instrument identifiers per category, unique and in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentCatalog {
    categories: BTreeMap<String, Vec<String>>,
}

impl InstrumentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a CSV file with `category,name` columns.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let catalog = Self::from_reader(File::open(path)?)?;
        tracing::info!(
            path = %path.display(),
            categories = catalog.categories.len(),
            "Loaded instrument catalog"
        );
        Ok(catalog)
    }

    /// Load a catalog from any CSV source. Rows missing either column are
    /// dropped; extra columns are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut catalog = Self::new();
        for result in rdr.deserialize() {
            let record: CatalogRecord = result?;
            if let (Some(category), Some(name)) = (record.category, record.name) {
                catalog.insert(&category, &name);
            }
        }
        Ok(catalog)
    }

    /// Build a catalog from the categories carried by quotes.
    pub fn from_quotes(quotes: &QuoteTable) -> Self {
        let mut catalog = Self::new();
        for quote in quotes.quotes() {
            if let Some(category) = &quote.category {
                catalog.insert(category, &quote.instrument);
            }
        }
        catalog
    }

    /// Add an instrument to a category. Blank values and repeats are ignored.
    pub fn insert(&mut self, category: &str, name: &str) {
        let (category, name) = (category.trim(), name.trim());
        if category.is_empty() || name.is_empty() {
            return;
        }
        let names = self.categories.entry(category.to_string()).or_default();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    /// Category names, sorted.
    pub fn categories(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    /// Instruments of one category; empty for an unknown category.
    pub fn instruments(&self, category: &str) -> &[String] {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Instruments eligible as benchmark.
    pub fn benchmarks(&self, benchmark_category: &str) -> &[String] {
        self.instruments(benchmark_category)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.categories.values().any(|names| names.iter().any(|n| n == name))
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
