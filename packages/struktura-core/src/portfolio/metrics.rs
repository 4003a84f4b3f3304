//! Performance metrics for daily return series.
//!
//! All functions are pure. Undefined results are NaN rather than errors, so a
//! metrics row always has the same shape.

use crate::types::{MetricsRow, ReturnSeries};
use std::collections::{BTreeMap, HashMap};

/// Trading days used to annualize daily figures.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Compute the seven comparison metrics of `returns`.
///
/// `reference_returns` only feeds the correlation figure; pass `returns`
/// itself for the benchmark's own row.
///
/// An empty `returns` series yields [`MetricsRow::undefined`]. A NaN anywhere
/// in `returns` propagates into every aggregate computed from it.
pub fn compute_metrics(returns: &ReturnSeries, reference_returns: &ReturnSeries) -> MetricsRow {
    if returns.is_empty() {
        tracing::debug!("Empty return series, metrics undefined");
        return MetricsRow::undefined();
    }

    let values = returns.values();
    let cagr = annualized_return(&values);
    let volatility = annualized_volatility(&values);
    let years = calendar_year_returns(returns);

    MetricsRow {
        cagr,
        volatility,
        sharpe: sharpe_ratio(cagr, volatility),
        max_drawdown: max_drawdown(&values),
        best_year: nan_max(years.values().copied()),
        worst_year: nan_min(years.values().copied()),
        correlation: correlation(returns, reference_returns),
    }
}

/// Arithmetic mean, NaN when empty.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator), NaN below two values.
///
/// A series without any variation is exactly zero.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    if values.iter().all(|v| *v == values[0]) {
        return 0.0;
    }

    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Mean daily return scaled to a year.
pub fn annualized_return(returns: &[f64]) -> f64 {
    mean(returns) * TRADING_DAYS_PER_YEAR
}

/// Standard deviation of daily returns scaled to a year.
pub fn annualized_volatility(returns: &[f64]) -> f64 {
    sample_std(returns) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Annualized return over annualized volatility, with no risk-free rate.
///
/// Zero volatility gives zero rather than a division by zero.
pub fn sharpe_ratio(annualized_return: f64, annualized_volatility: f64) -> f64 {
    if annualized_volatility == 0.0 {
        return 0.0;
    }
    annualized_return / annualized_volatility
}

/// Largest fall of the cumulative growth factor below its running peak.
///
/// The growth factor is the running product of `1 + r`; the peak starts at
/// the first growth value. The drawdown is an absolute difference of growth
/// factors, reported as a non-positive number.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    if returns.is_empty() || returns.iter().any(|r| r.is_nan()) {
        return f64::NAN;
    }

    let mut growth = 1.0;
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;

    for r in returns {
        growth *= 1.0 + r;
        peak = peak.max(growth);
        max_dd = max_dd.max(peak - growth);
    }

    0.0 - max_dd
}

/// Compounded return per calendar year present in the series.
pub fn calendar_year_returns(returns: &ReturnSeries) -> BTreeMap<i32, f64> {
    let mut growth: BTreeMap<i32, f64> = BTreeMap::new();
    for point in &returns.points {
        *growth.entry(point.year()).or_insert(1.0) *= 1.0 + point.value;
    }
    growth.into_iter().map(|(year, g)| (year, g - 1.0)).collect()
}

/// Pearson correlation of two series on the dates they share.
///
/// NaN when fewer than two dates are shared.
pub fn correlation(returns: &ReturnSeries, reference: &ReturnSeries) -> f64 {
    let reference_by_date: HashMap<_, _> =
        reference.points.iter().map(|p| (p.date, p.value)).collect();

    let (x, y): (Vec<f64>, Vec<f64>) = returns
        .points
        .iter()
        .filter_map(|p| reference_by_date.get(&p.date).map(|r| (p.value, *r)))
        .unzip();

    if x.len() < 2 {
        return f64::NAN;
    }
    pearson(&x, &y)
}

/// Pearson correlation coefficient of two equally long slices.
///
/// NaN for mismatched lengths, fewer than two values, or zero variance on
/// either side.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }

    let mx = mean(x);
    let my = mean(y);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }

    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

fn nan_max(values: impl Iterator<Item = f64>) -> f64 {
    let mut result: Option<f64> = None;
    for v in values {
        result = Some(match result {
            None => v,
            Some(acc) if acc.is_nan() || v.is_nan() => f64::NAN,
            Some(acc) => acc.max(v),
        });
    }
    result.unwrap_or(f64::NAN)
}

fn nan_min(values: impl Iterator<Item = f64>) -> f64 {
    -nan_max(values.map(|v| -v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SeriesPoint;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn series_from(start: NaiveDate, values: &[f64]) -> ReturnSeries {
        ReturnSeries::new(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| SeriesPoint::new(start + Duration::days(i as i64), *v))
                .collect(),
        )
    }

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, day).unwrap()
    }

    #[test]
    fn test_annualized_return_and_volatility() {
        let returns = vec![0.01, -0.02, 0.03, 0.0];

        assert_relative_eq!(annualized_return(&returns), 0.005 * 252.0, epsilon = 1e-12);

        // Sample variance: (0.005^2 + 0.025^2 + 0.025^2 + 0.005^2) / 3
        let expected_std = (0.0013_f64 / 3.0).sqrt();
        assert_relative_eq!(
            annualized_volatility(&returns),
            expected_std * 252.0_f64.sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_zero_volatility_sharpe_is_zero() {
        let returns = series_from(jan(3), &[0.001, 0.001, 0.001, 0.001, 0.001]);
        let row = compute_metrics(&returns, &returns);

        assert_eq!(row.volatility, 0.0);
        assert_eq!(row.sharpe, 0.0);
        assert!(row.cagr > 0.0);
    }

    #[test]
    fn test_sharpe_ratio() {
        assert_relative_eq!(sharpe_ratio(0.2, 0.1), 2.0);
        assert_eq!(sharpe_ratio(0.2, 0.0), 0.0);
        assert!(sharpe_ratio(0.2, f64::NAN).is_nan());
    }

    #[test]
    fn test_max_drawdown() {
        // Growth: 1.10, 1.155, 0.98175, 0.883575, 0.92775375
        let returns = vec![0.10, 0.05, -0.15, -0.10, 0.05];
        let mdd = max_drawdown(&returns);

        assert_relative_eq!(mdd, -(1.155 - 0.883575), epsilon = 1e-12);
    }

    #[test]
    fn test_max_drawdown_peak_starts_at_first_growth() {
        // A first-day loss is not a drawdown from 1.0
        let mdd = max_drawdown(&[-0.5, 0.1]);
        assert_eq!(mdd, 0.0);
    }

    #[test]
    fn test_max_drawdown_non_negative_returns() {
        let mdd = max_drawdown(&[0.01, 0.0, 0.03, 0.01]);
        assert_eq!(mdd, 0.0);
        assert!(mdd.is_sign_positive());
    }

    #[test]
    fn test_calendar_years() {
        let returns = ReturnSeries::new(vec![
            SeriesPoint::new(NaiveDate::from_ymd_opt(2021, 12, 30).unwrap(), 0.10),
            SeriesPoint::new(NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(), 0.10),
            SeriesPoint::new(NaiveDate::from_ymd_opt(2022, 1, 3).unwrap(), -0.20),
            SeriesPoint::new(NaiveDate::from_ymd_opt(2022, 1, 4).unwrap(), 0.05),
        ]);

        let years = calendar_year_returns(&returns);
        assert_eq!(years.len(), 2);
        assert_relative_eq!(years[&2021], 0.21, epsilon = 1e-12);
        assert_relative_eq!(years[&2022], -0.16, epsilon = 1e-12);

        let row = compute_metrics(&returns, &returns);
        assert_relative_eq!(row.best_year, 0.21, epsilon = 1e-12);
        assert_relative_eq!(row.worst_year, -0.16, epsilon = 1e-12);
    }

    #[test]
    fn test_self_correlation_is_one() {
        let returns = series_from(jan(3), &[0.01, -0.02, 0.03, 0.005, -0.011]);
        let row = compute_metrics(&returns, &returns);
        assert_eq!(row.correlation, 1.0);
    }

    #[test]
    fn test_correlation_on_common_dates_only() {
        let a = series_from(jan(3), &[0.01, 0.02, 0.03, 0.04]);
        // Shares jan 4..=6 with `a`, moves opposite
        let b = series_from(jan(4), &[-0.02, -0.03, -0.04, 0.5]);

        assert_relative_eq!(correlation(&a, &b), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_correlation_without_overlap() {
        let portfolio = series_from(jan(3), &[0.01, 0.02, -0.01]);
        let benchmark = series_from(jan(20), &[0.01, -0.02, 0.03]);

        let row = compute_metrics(&portfolio, &benchmark);
        assert!(row.correlation.is_nan());
        assert!(row.cagr.is_finite());
        assert!(row.volatility.is_finite());
        assert!(row.sharpe.is_finite());
        assert!(row.max_drawdown <= 0.0);
        assert!(row.best_year.is_finite());
    }

    #[test]
    fn test_correlation_single_common_date() {
        let a = series_from(jan(3), &[0.01, 0.02]);
        let b = series_from(jan(4), &[0.03, 0.04]);
        assert!(correlation(&a, &b).is_nan());
    }

    #[test]
    fn test_pearson() {
        assert_relative_eq!(pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]), 1.0, epsilon = 1e-12);
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
        assert!(pearson(&[1.0, 2.0], &[1.0]).is_nan());
    }

    #[test]
    fn test_empty_series_is_undefined() {
        let empty = ReturnSeries::default();
        let row = compute_metrics(&empty, &empty);

        for (label, value) in row.labeled() {
            assert!(value.is_nan(), "{} should be NaN", label);
        }
    }

    #[test]
    fn test_single_return() {
        let returns = series_from(jan(3), &[0.02]);
        let row = compute_metrics(&returns, &returns);

        assert_relative_eq!(row.cagr, 0.02 * 252.0, epsilon = 1e-12);
        assert!(row.volatility.is_nan());
        assert!(row.sharpe.is_nan());
        assert_eq!(row.max_drawdown, 0.0);
        assert_relative_eq!(row.best_year, 0.02, epsilon = 1e-12);
        assert!(row.correlation.is_nan());
    }

    #[test]
    fn test_nan_propagates() {
        let returns = series_from(jan(3), &[0.01, f64::NAN, 0.02]);
        let row = compute_metrics(&returns, &returns);

        assert!(row.cagr.is_nan());
        assert!(row.volatility.is_nan());
        assert!(row.sharpe.is_nan());
        assert!(row.max_drawdown.is_nan());
        assert!(row.best_year.is_nan());
        assert!(row.worst_year.is_nan());
        assert!(row.correlation.is_nan());
    }
}
