//! Markdown report rendered from a [`RunSummary`].
//!
//! The report becomes the run description in TestRail and the comment on the
//! submitted result, so the layout is part of the external contract.

use crate::results::{CoverageStat, RunSummary};

/// Renders the markdown table block describing one run.
///
/// The coverage section is appended only when coverage was collected and the
/// branch percentage is non-zero; an all-zero coverage map usually means the
/// runner was configured without instrumentation.
pub fn format_report(summary: &RunSummary) -> String {
    let mut report = String::new();
    report.push_str("# Unit / Component test results:\n");
    report.push_str("||| Type       | Total | Passed | Skipped | Failed\n");
    report.push_str(&format!(
        "|| Test Suites | {} | {} | {} | {}\n",
        summary.total_suites, summary.passed_suites, summary.pending_suites, summary.failed_suites
    ));
    report.push_str(&format!(
        "|| Tests       | {} | {} | {} | {}",
        summary.total_tests, summary.passed_tests, summary.pending_tests, summary.failed_tests
    ));

    if let Some(coverage) = &summary.coverage {
        if coverage.branches.pct != 0.0 {
            report.push_str("\n\n# Unit tests Coverage:\n\n");
            report.push_str("||| Type      | Percentage | Total | Covered | Skipped");
            push_metric(&mut report, "functions", &coverage.functions);
            push_metric(&mut report, "statements", &coverage.statements);
            push_metric(&mut report, "lines", &coverage.lines);
            push_metric(&mut report, "branches", &coverage.branches);
        }
    }

    report
}

fn push_metric(report: &mut String, label: &str, stat: &CoverageStat) {
    report.push_str(&format!(
        "\n|| {:<10} | {}% | {} | {} | {}",
        label, stat.pct, stat.total, stat.covered, stat.skipped
    ));
}
