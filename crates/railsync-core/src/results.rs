//! Aggregated results handed over by the host test runner at suite end.

use serde::Deserialize;

/// Totals for one completed test-suite execution.
///
/// Aliases accept the camelCase aggregate JS test runners emit, so a results
/// document can be fed in unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RunSummary {
    #[serde(alias = "numTotalTestSuites")]
    pub total_suites: u64,

    #[serde(alias = "numPassedTestSuites")]
    pub passed_suites: u64,

    #[serde(alias = "numPendingTestSuites")]
    pub pending_suites: u64,

    #[serde(alias = "numFailedTestSuites")]
    pub failed_suites: u64,

    #[serde(alias = "numTotalTests")]
    pub total_tests: u64,

    #[serde(alias = "numPassedTests")]
    pub passed_tests: u64,

    #[serde(alias = "numPendingTests")]
    pub pending_tests: u64,

    #[serde(alias = "numFailedTests")]
    pub failed_tests: u64,

    /// Coverage totals, when the runner collected them.
    pub coverage: Option<CoverageSummary>,
}

impl RunSummary {
    /// True when any test failed; drives the submitted result status.
    pub fn failed(&self) -> bool {
        self.failed_tests > 0
    }
}

/// Coverage totals per metric kind.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CoverageSummary {
    pub statements: CoverageStat,
    pub branches: CoverageStat,
    pub functions: CoverageStat,
    pub lines: CoverageStat,
}

/// One coverage metric.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CoverageStat {
    pub pct: f64,
    pub total: u64,
    pub covered: u64,
    pub skipped: u64,
}
