//! Upstream data sources: the quote table and the instrument catalog.

mod catalog;
mod quotes;

pub use catalog::InstrumentCatalog;
pub use quotes::{parse_date, QuoteTable};
