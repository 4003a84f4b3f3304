//! Portfolio value series construction.

use crate::portfolio::{GapPolicy, PortfolioSpec, PricePanel};
use crate::types::{DateRange, Quote, SeriesPoint, ValueSeries};
use crate::{Result, ValidationError};

/// Build the value series of a fixed-weight portfolio.
///
/// Every instrument is normalized to 1.0 on the first panel date, scaled by
/// its weight, summed per date and multiplied by `starting_capital`. Weights
/// are not rebalanced, so the output is a weighted index.
///
/// # Arguments
///
/// * `quotes` - Full quote table, in any order
/// * `spec` - Validated portfolio weights
/// * `range` - Inclusive date range
/// * `starting_capital` - Value of the portfolio on the first panel date
/// * `policy` - How missing normalized prices enter the per-date sum
///
/// # Returns
///
/// The value series with any detected data gaps attached. An instrument with
/// no price on the first panel date has no normalization base; under
/// [`GapPolicy::Propagate`] every value of the series is then NaN, under
/// [`GapPolicy::Skip`] that instrument contributes nothing.
pub fn build_value_series(
    quotes: &[Quote],
    spec: &PortfolioSpec,
    range: DateRange,
    starting_capital: f64,
    policy: GapPolicy,
) -> Result<ValueSeries> {
    if !range.is_ordered() {
        return Err(ValidationError::InvalidDateRange {
            start: range.start,
            end: range.end,
        }
        .into());
    }
    if !starting_capital.is_finite() || starting_capital <= 0.0 {
        return Err(ValidationError::NonPositiveCapital(starting_capital).into());
    }

    let panel = PricePanel::from_quotes(quotes, &spec.instruments(), range);
    let gaps = panel.gaps();
    for gap in &gaps {
        tracing::warn!(portfolio = spec.name(), "Data gap: {}", gap);
    }

    let index = panel
        .forward_fill()
        .normalize()
        .weighted(spec)
        .row_sums(policy);

    let points: Vec<SeriesPoint> = panel
        .dates()
        .iter()
        .zip(index)
        .map(|(date, value)| SeriesPoint::new(*date, value * starting_capital))
        .collect();

    tracing::debug!(
        portfolio = spec.name(),
        dates = points.len(),
        instruments = panel.instruments().len(),
        "Built value series"
    );

    Ok(ValueSeries { points, gaps })
}
