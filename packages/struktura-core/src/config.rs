//! Settings loaded from a TOML file.

use crate::portfolio::GapPolicy;
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Defaults applied when a request or the command line leaves a value out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Quote table CSV
    pub quotes_path: PathBuf,
    /// Instrument catalog CSV
    pub catalog_path: PathBuf,
    /// Starting capital when a request omits it
    pub starting_capital: f64,
    /// Earliest selectable date
    pub start_date: NaiveDate,
    /// Catalog category whose instruments may be used as benchmark
    pub benchmark_category: String,
    /// Treatment of instruments without a first-date price
    pub gap_policy: GapPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quotes_path: PathBuf::from("notowania_gpw_full.csv"),
            catalog_path: PathBuf::from("tickery.csv"),
            starting_capital: 10_000.0,
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            benchmark_category: "indeksy".to_string(),
            gap_policy: GapPolicy::default(),
        }
    }
}

impl Settings {
    /// Get the default settings file path.
    ///
    /// Default path: `~/.struktura/config.toml`
    /// Can be overridden with `STRUKTURA_CONFIG` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("STRUKTURA_CONFIG") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".struktura/config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Load settings from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load settings from a specific path; a missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text. Missing keys take their defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
