//! Fixed portfolio weights, validated once at construction.

use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Weights are integer percentages.
pub const FULL_WEIGHT: u32 = 100;

/// One instrument and its share of the starting capital.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Holding {
    /// Instrument identifier
    pub instrument: String,
    /// Weight percentage (0-100)
    pub weight: u32,
}

impl Holding {
    pub fn new(instrument: &str, weight: u32) -> Self {
        Self {
            instrument: instrument.to_string(),
            weight,
        }
    }
}

/// A validated, ordered set of holdings whose weights sum to exactly 100.
///
/// Weights apply at the first panel date only; afterwards each holding drifts
/// with its own price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioSpec {
    name: String,
    holdings: Vec<Holding>,
}

impl PortfolioSpec {
    /// Validate holdings and build a portfolio.
    ///
    /// Instrument identifiers are trimmed; order is preserved.
    pub fn new(name: &str, holdings: Vec<Holding>) -> Result<Self, ValidationError> {
        if holdings.is_empty() {
            return Err(ValidationError::EmptySelection(name.to_string()));
        }

        let mut seen = HashSet::new();
        let mut cleaned = Vec::with_capacity(holdings.len());
        for holding in holdings {
            let instrument = holding.instrument.trim().to_string();
            if instrument.is_empty() {
                return Err(ValidationError::EmptyInstrument {
                    portfolio: name.to_string(),
                });
            }
            if !seen.insert(instrument.clone()) {
                return Err(ValidationError::DuplicateInstrument {
                    portfolio: name.to_string(),
                    instrument,
                });
            }
            if holding.weight > FULL_WEIGHT {
                return Err(ValidationError::WeightOutOfRange {
                    portfolio: name.to_string(),
                    instrument,
                    weight: holding.weight,
                });
            }
            cleaned.push(Holding {
                instrument,
                weight: holding.weight,
            });
        }

        let total: u32 = cleaned.iter().map(|h| h.weight).sum();
        if total != FULL_WEIGHT {
            return Err(ValidationError::WeightSum {
                portfolio: name.to_string(),
                total,
            });
        }

        Ok(Self {
            name: name.to_string(),
            holdings: cleaned,
        })
    }

    /// A single instrument at full weight, used for benchmarks.
    pub fn single(instrument: &str) -> Result<Self, ValidationError> {
        Self::new(instrument, vec![Holding::new(instrument, FULL_WEIGHT)])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    /// Instrument identifiers in declaration order.
    pub fn instruments(&self) -> Vec<&str> {
        self.holdings.iter().map(|h| h.instrument.as_str()).collect()
    }

    pub fn weight_of(&self, instrument: &str) -> Option<u32> {
        self.holdings
            .iter()
            .find(|h| h.instrument == instrument)
            .map(|h| h.weight)
    }

    /// Weight as a fraction of one.
    pub fn fraction_of(&self, instrument: &str) -> Option<f64> {
        self.weight_of(instrument)
            .map(|w| f64::from(w) / f64::from(FULL_WEIGHT))
    }
}
