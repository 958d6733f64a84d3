//! Request and response types for the TestRail API v2 endpoints we drive.

use serde::{Deserialize, Serialize};

/// `status_id` for a passing result.
pub const STATUS_PASSED: u32 = 1;

/// `status_id` for a failing result.
pub const STATUS_FAILED: u32 = 5;

/// A test run record. TestRail returns many more fields; only the ones the
/// reporter reads are modeled here, the rest are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// Run identifier.
    pub id: u32,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Free-form description (null on the wire when never set).
    #[serde(default)]
    pub description: Option<String>,

    /// Reference string used as the correlation key across invocations.
    #[serde(default)]
    pub refs: Option<String>,
}

/// A test entry inside a run, carrying the case it instantiates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Test {
    /// Test identifier.
    pub id: u32,

    /// The case this test was created from.
    pub case_id: u32,
}

/// Payload for `add_run`.
#[derive(Debug, Clone, Serialize)]
pub struct NewRun {
    /// Suite the run is scoped to.
    pub suite_id: u32,

    /// When false, only `case_ids` are included.
    pub include_all: bool,

    /// Cases to include.
    pub case_ids: Vec<u32>,

    /// Display name.
    pub name: String,

    /// Free-form description.
    pub description: String,

    /// Reference string (correlation key).
    pub refs: String,
}

/// Payload for `update_run`.
#[derive(Debug, Clone, Serialize)]
pub struct RunUpdate {
    /// Replacement description.
    pub description: String,

    /// Replacement case list (TestRail accepts duplicates).
    pub case_ids: Vec<u32>,
}

/// Payload for `add_plan_entry`.
#[derive(Debug, Clone, Serialize)]
pub struct NewPlanEntry {
    /// Suite the entry's run is scoped to.
    pub suite_id: u32,

    /// When false, only `case_ids` are included.
    pub include_all: bool,

    /// Cases to include.
    pub case_ids: Vec<u32>,

    /// Display name for the entry and its run.
    pub name: String,

    /// Free-form description.
    pub description: String,
}

/// A plan entry as returned by `add_plan_entry`, grouping one or more runs.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanEntry {
    /// Entry identifier (a GUID string).
    #[serde(default)]
    pub id: Option<String>,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Runs created for this entry.
    #[serde(default)]
    pub runs: Vec<Run>,
}

/// One result to attach via `add_results_for_cases`.
#[derive(Debug, Clone, Serialize)]
pub struct NewResult {
    /// Case the result belongs to.
    pub case_id: u32,

    /// [`STATUS_PASSED`] or [`STATUS_FAILED`].
    pub status_id: u32,

    /// Free-form comment shown with the result.
    pub comment: String,
}

/// A stored result as echoed back by `add_results_for_cases`.
#[derive(Debug, Clone, Deserialize)]
pub struct CaseResult {
    /// Result identifier.
    #[serde(default)]
    pub id: u64,

    /// Test the result was recorded against.
    #[serde(default)]
    pub test_id: u32,

    /// Recorded status.
    #[serde(default)]
    pub status_id: u32,
}

/// `get_runs` response shape: older deployments answer with a bare array,
/// newer ones paginate behind a wrapper object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RunsResponse {
    Flat(Vec<Run>),
    Paged { runs: Vec<Run> },
}

impl RunsResponse {
    pub fn into_runs(self) -> Vec<Run> {
        match self {
            Self::Flat(runs) | Self::Paged { runs } => runs,
        }
    }
}

/// `get_tests` response shape, same bare-or-paginated split as [`RunsResponse`].
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TestsResponse {
    Flat(Vec<Test>),
    Paged { tests: Vec<Test> },
}

impl TestsResponse {
    pub fn into_tests(self) -> Vec<Test> {
        match self {
            Self::Flat(tests) | Self::Paged { tests } => tests,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_tolerates_null_fields() {
        let run: Run = serde_json::from_str(r#"{"id": 7, "refs": null, "description": null}"#)
            .expect("parse failed");
        assert_eq!(run.id, 7);
        assert_eq!(run.name, "");
        assert!(run.refs.is_none());
        assert!(run.description.is_none());
    }

    #[test]
    fn test_runs_response_flat_and_paged() {
        let flat: RunsResponse =
            serde_json::from_str(r#"[{"id": 1}, {"id": 2}]"#).expect("parse failed");
        assert_eq!(flat.into_runs().len(), 2);

        let paged: RunsResponse =
            serde_json::from_str(r#"{"offset": 0, "limit": 250, "runs": [{"id": 3}]}"#)
                .expect("parse failed");
        let runs = paged.into_runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].id, 3);
    }

    #[test]
    fn test_tests_response_flat_and_paged() {
        let flat: TestsResponse =
            serde_json::from_str(r#"[{"id": 10, "case_id": 100}]"#).expect("parse failed");
        assert_eq!(flat.into_tests()[0].case_id, 100);

        let paged: TestsResponse =
            serde_json::from_str(r#"{"tests": [{"id": 11, "case_id": 101}]}"#)
                .expect("parse failed");
        assert_eq!(paged.into_tests()[0].case_id, 101);
    }

    #[test]
    fn test_new_run_serializes_expected_fields() {
        let payload = NewRun {
            suite_id: 2,
            include_all: false,
            case_ids: vec![123],
            name: "main#42".to_string(),
            description: "report".to_string(),
            refs: "main#42".to_string(),
        };
        let json = serde_json::to_value(&payload).expect("serialize failed");
        assert_eq!(json["suite_id"], 2);
        assert_eq!(json["include_all"], false);
        assert_eq!(json["case_ids"], serde_json::json!([123]));
        assert_eq!(json["refs"], "main#42");
    }
}
