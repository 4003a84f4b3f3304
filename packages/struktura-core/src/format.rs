//! Formatting helpers for tabular display of metrics.

use crate::portfolio::AnalysisReport;

/// Format a fraction as a percentage with two decimals, `N/A` when undefined.
pub fn format_percent(value: f64) -> String {
    if value.is_nan() {
        return "N/A".to_string();
    }
    format!("{:.2}%", value * 100.0)
}

/// Render the metrics of a report as a fixed-width text table.
///
/// Every metric, Sharpe ratio included, is shown as a percentage.
pub fn metrics_table(report: &AnalysisReport) -> String {
    let headers = report.columns().map(|c| c.name.as_str());
    let mut out = format!(
        "{:<14}{:>14}{:>14}{:>14}\n",
        "", headers[0], headers[1], headers[2]
    );
    for (label, values) in report.metrics_table() {
        out.push_str(&format!(
            "{:<14}{:>14}{:>14}{:>14}\n",
            label,
            format_percent(values[0]),
            format_percent(values[1]),
            format_percent(values[2])
        ));
    }
    out
}
