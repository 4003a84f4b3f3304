//! Portfolio valuation and comparison.
//!
//! Provides fixed-weight portfolio construction, price panels, value series
//! and performance metrics.

mod allocation;
mod analysis;
mod builder;
mod metrics;
mod panel;

pub use allocation::{Holding, PortfolioSpec, FULL_WEIGHT};
pub use analysis::{
    analyze, AnalysisReport, AnalysisRequest, SeriesReport, ValidatedRequest, PORTFOLIO_1,
    PORTFOLIO_2,
};
pub use builder::build_value_series;
pub use metrics::{
    annualized_return, annualized_volatility, calendar_year_returns, compute_metrics,
    correlation, max_drawdown, mean, pearson, sample_std, sharpe_ratio, TRADING_DAYS_PER_YEAR,
};
pub use panel::{GapPolicy, PricePanel};
