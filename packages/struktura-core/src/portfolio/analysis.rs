//! Side-by-side analysis of two portfolios against a benchmark.

use crate::data::QuoteTable;
use crate::portfolio::{build_value_series, compute_metrics, GapPolicy, Holding, PortfolioSpec};
use crate::types::{DataGap, DateRange, MetricsRow, ReturnSeries, SeriesPoint, ValueSeries};
use crate::{Result, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const PORTFOLIO_1: &str = "Portfolio 1";
pub const PORTFOLIO_2: &str = "Portfolio 2";

/// Raw analysis request, as received from a form or a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRequest {
    pub portfolio_1: Vec<Holding>,
    pub portfolio_2: Vec<Holding>,
    /// Benchmark instrument identifier
    pub benchmark: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub starting_capital: f64,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub portfolio_1: PortfolioSpec,
    pub portfolio_2: PortfolioSpec,
    pub benchmark: PortfolioSpec,
    pub range: DateRange,
    pub starting_capital: f64,
}

impl AnalysisRequest {
    /// Check every input without touching any quote.
    pub fn validate(&self) -> std::result::Result<ValidatedRequest, ValidationError> {
        let portfolio_1 = PortfolioSpec::new(PORTFOLIO_1, self.portfolio_1.clone())?;
        let portfolio_2 = PortfolioSpec::new(PORTFOLIO_2, self.portfolio_2.clone())?;

        if self.benchmark.trim().is_empty() {
            return Err(ValidationError::MissingBenchmark);
        }
        let benchmark = PortfolioSpec::single(&self.benchmark)?;

        let range = DateRange::new(self.start_date, self.end_date);
        if !range.is_ordered() {
            return Err(ValidationError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }

        if !self.starting_capital.is_finite() || self.starting_capital <= 0.0 {
            return Err(ValidationError::NonPositiveCapital(self.starting_capital));
        }

        Ok(ValidatedRequest {
            portfolio_1,
            portfolio_2,
            benchmark,
            range,
            starting_capital: self.starting_capital,
        })
    }
}

/// Value series and metrics of one portfolio or the benchmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesReport {
    pub name: String,
    pub series: Vec<SeriesPoint>,
    pub metrics: MetricsRow,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gaps: Vec<DataGap>,
}

/// Result of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub portfolio_1: SeriesReport,
    pub portfolio_2: SeriesReport,
    pub benchmark: SeriesReport,
}

impl AnalysisReport {
    /// Reports in display order.
    pub fn columns(&self) -> [&SeriesReport; 3] {
        [&self.portfolio_1, &self.portfolio_2, &self.benchmark]
    }

    /// One row per metric, one value per column.
    pub fn metrics_table(&self) -> Vec<(&'static str, [f64; 3])> {
        let [p1, p2, bench] = self.columns().map(|c| c.metrics.labeled());
        (0..p1.len())
            .map(|i| (p1[i].0, [p1[i].1, p2[i].1, bench[i].1]))
            .collect()
    }

    pub fn has_gaps(&self) -> bool {
        self.columns().iter().any(|c| !c.gaps.is_empty())
    }
}

/// Value both portfolios and the benchmark, then compare them.
///
/// Validation happens first; a rejected request never reads `quotes`. Each
/// series is measured against the benchmark returns, the benchmark against
/// itself.
pub fn analyze(
    quotes: &QuoteTable,
    request: &AnalysisRequest,
    policy: GapPolicy,
) -> Result<AnalysisReport> {
    let validated = request.validate()?;

    tracing::info!(
        benchmark = %request.benchmark,
        start = %validated.range.start,
        end = %validated.range.end,
        capital = validated.starting_capital,
        "Running portfolio analysis"
    );

    let build = |spec: &PortfolioSpec| {
        build_value_series(
            quotes.quotes(),
            spec,
            validated.range,
            validated.starting_capital,
            policy,
        )
    };

    let p1 = build(&validated.portfolio_1)?;
    let p2 = build(&validated.portfolio_2)?;
    let bench = build(&validated.benchmark)?;

    let bench_returns = bench.returns();

    Ok(AnalysisReport {
        portfolio_1: report(&validated.portfolio_1, p1, &bench_returns),
        portfolio_2: report(&validated.portfolio_2, p2, &bench_returns),
        benchmark: report(&validated.benchmark, bench, &bench_returns),
    })
}

fn report(spec: &PortfolioSpec, series: ValueSeries, reference: &ReturnSeries) -> SeriesReport {
    let metrics = compute_metrics(&series.returns(), reference);
    tracing::debug!(
        name = spec.name(),
        cagr = metrics.cagr,
        sharpe = metrics.sharpe,
        "Computed metrics"
    );

    SeriesReport {
        name: spec.name().to_string(),
        series: series.points,
        metrics,
        gaps: series.gaps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Quote;
    use approx::assert_relative_eq;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, day).unwrap()
    }

    fn quotes() -> QuoteTable {
        QuoteTable::new(vec![
            Quote::new("A", d(1), 100.0),
            Quote::new("A", d(2), 110.0),
            Quote::new("A", d(5), 121.0),
            Quote::new("A", d(6), 115.0),
            Quote::new("B", d(1), 50.0),
            Quote::new("B", d(2), 55.0),
            Quote::new("B", d(5), 60.5),
            Quote::new("B", d(6), 61.0),
            Quote::new("IDX", d(1), 1000.0),
            Quote::new("IDX", d(2), 1010.0),
            Quote::new("IDX", d(5), 1030.0),
            Quote::new("IDX", d(6), 1000.0),
        ])
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            portfolio_1: vec![Holding::new("A", 50), Holding::new("B", 50)],
            portfolio_2: vec![Holding::new("A", 100)],
            benchmark: "IDX".to_string(),
            start_date: d(1),
            end_date: d(30),
            starting_capital: 10_000.0,
        }
    }

    #[test]
    fn test_analyze() {
        let report = analyze(&quotes(), &request(), GapPolicy::default()).unwrap();

        assert_eq!(report.portfolio_1.name, PORTFOLIO_1);
        assert_eq!(report.benchmark.name, "IDX");
        assert_eq!(report.portfolio_1.series.len(), 4);
        assert_eq!(report.portfolio_1.series[0].value, 10_000.0);
        assert_eq!(report.benchmark.series[0].value, 10_000.0);
        assert_relative_eq!(report.benchmark.series[3].value, 10_000.0, epsilon = 1e-9);
        assert_eq!(report.benchmark.metrics.correlation, 1.0);
        assert!(report.portfolio_2.metrics.correlation.is_finite());
        assert!(!report.has_gaps());
    }

    #[test]
    fn test_metrics_table_layout() {
        let report = analyze(&quotes(), &request(), GapPolicy::default()).unwrap();
        let table = report.metrics_table();

        let labels: Vec<_> = table.iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            vec![
                "CAGR",
                "Volatility",
                "Sharpe Ratio",
                "Max Drawdown",
                "Best Year",
                "Worst Year",
                "Correlation"
            ]
        );
        assert_eq!(table[2].1[2], report.benchmark.metrics.sharpe);
    }

    #[test]
    fn test_bad_weights_rejected_before_lookup() {
        let mut req = request();
        req.portfolio_1 = vec![Holding::new("A", 60), Holding::new("B", 30)];

        // An empty table would otherwise produce empty series, not an error
        let err = analyze(&QuoteTable::default(), &req, GapPolicy::default()).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Validation(ValidationError::WeightSum { total: 90, .. })
        ));
    }

    #[test]
    fn test_validation_reasons_are_distinct() {
        let mut req = request();
        req.portfolio_2 = vec![];
        let empty = req.validate().unwrap_err();
        assert_eq!(empty, ValidationError::EmptySelection(PORTFOLIO_2.to_string()));

        let mut req = request();
        req.portfolio_2 = vec![Holding::new("A", 99)];
        let sum = req.validate().unwrap_err();

        assert_ne!(empty.to_string(), sum.to_string());
    }

    #[test]
    fn test_validation_of_benchmark_dates_and_capital() {
        let mut req = request();
        req.benchmark = " ".to_string();
        assert_eq!(req.validate().unwrap_err(), ValidationError::MissingBenchmark);

        let mut req = request();
        req.start_date = d(30);
        req.end_date = d(1);
        assert!(matches!(
            req.validate().unwrap_err(),
            ValidationError::InvalidDateRange { .. }
        ));

        let mut req = request();
        req.starting_capital = 0.0;
        assert!(matches!(
            req.validate().unwrap_err(),
            ValidationError::NonPositiveCapital(_)
        ));
    }

    #[test]
    fn test_benchmark_without_overlap() {
        let mut table = quotes().into_inner();
        table.retain(|q| q.instrument != "IDX");
        table.extend([
            Quote::new("IDX", d(20), 1000.0),
            Quote::new("IDX", d(21), 1010.0),
            Quote::new("IDX", d(22), 1020.0),
        ]);

        let report =
            analyze(&QuoteTable::new(table), &request(), GapPolicy::default()).unwrap();

        assert!(report.portfolio_1.metrics.correlation.is_nan());
        assert!(report.portfolio_1.metrics.cagr.is_finite());
        assert!(report.portfolio_1.metrics.volatility.is_finite());
        assert_eq!(report.benchmark.metrics.correlation, 1.0);
    }

    #[test]
    fn test_report_json_shape() {
        let report = analyze(&quotes(), &request(), GapPolicy::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        for key in ["portfolio_1", "portfolio_2", "benchmark"] {
            assert!(json[key]["series"].is_array());
            assert_eq!(json[key]["series"][0]["date"], "2023-06-01");
            for metric in [
                "cagr",
                "volatility",
                "sharpe",
                "max_drawdown",
                "best_year",
                "worst_year",
                "correlation",
            ] {
                assert!(json[key]["metrics"].get(metric).is_some());
            }
            assert!(json[key].get("gaps").is_none());
        }
    }

    #[test]
    fn test_report_with_gaps_reads_back() {
        let mut req = request();
        req.portfolio_2 = vec![Holding::new("A", 50), Holding::new("NONE", 50)];
        let report = analyze(&quotes(), &req, GapPolicy::Propagate).unwrap();
        assert!(report.portfolio_2.metrics.cagr.is_nan());

        let json = serde_json::to_string(&report).unwrap();
        let back: AnalysisReport = serde_json::from_str(&json).unwrap();

        assert_eq!(back.portfolio_2.gaps, report.portfolio_2.gaps);
        assert!(back.portfolio_2.series.iter().all(|p| p.value.is_nan()));
        assert!(back.portfolio_2.metrics.correlation.is_nan());
        assert_eq!(back.portfolio_1.series.len(), report.portfolio_1.series.len());
        assert_relative_eq!(
            back.portfolio_1.metrics.cagr,
            report.portfolio_1.metrics.cagr,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_request_from_json() {
        let json = r#"{
            "portfolio_1": [{"instrument": "A", "weight": 50}, {"instrument": "B", "weight": 50}],
            "portfolio_2": [{"instrument": "A", "weight": 100}],
            "benchmark": "IDX",
            "start_date": "2023-06-01",
            "end_date": "2023-06-30",
            "starting_capital": 10000
        }"#;
        let req: AnalysisRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req, request());
    }
}
