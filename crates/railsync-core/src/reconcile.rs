//! Run reconciliation: locating or creating the service-side run for the
//! current branch/build series and attaching the coverage result to it.

use railsync_api::{
    ApiError, ApiResult, NewPlanEntry, NewResult, NewRun, RunUpdate, TestRailClient,
    STATUS_FAILED, STATUS_PASSED,
};
use tracing::debug;

use crate::console::{ConsoleEvent, ConsoleSink};

/// Where the run for this series lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTarget {
    /// Match the project's open runs by reference; update in place or create.
    Project { project_id: u32 },
    /// Append a fresh run to an existing plan. No matching step exists here;
    /// every invocation adds a new plan entry.
    Plan { plan_id: u32 },
}

/// Everything one reconciliation needs, with identifiers already validated.
#[derive(Debug, Clone)]
pub struct ReconcileRequest {
    pub target: RunTarget,
    pub suite_id: u32,
    pub coverage_case_id: u32,
    /// Rendered run name.
    pub name: String,
    /// Rendered reference (the correlation key; may be empty).
    pub reference: String,
    /// Configured run description; empty when none was configured.
    pub description: String,
    /// Rendered markdown report.
    pub report: String,
    pub results_failed: bool,
}

/// What one reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Run that received the result.
    pub run_id: u32,
    /// True when an existing run was updated instead of created.
    pub updated: bool,
    /// True when the service echoed back at least one stored result.
    pub acknowledged: bool,
}

/// Locates or creates the run for `request`, then attaches the result.
///
/// Console lines for the run step are emitted as soon as that step succeeds,
/// so a later failure still leaves the earlier confirmation visible. Any
/// service failure aborts the remaining steps and surfaces as the error.
pub async fn reconcile(
    client: &TestRailClient,
    request: &ReconcileRequest,
    sink: &ConsoleSink,
) -> ApiResult<ReconcileOutcome> {
    let (run_id, updated) = match request.target {
        RunTarget::Project { project_id } => {
            reconcile_project_run(client, request, project_id, sink).await?
        }
        RunTarget::Plan { plan_id } => {
            let run_id = append_plan_entry(client, request, plan_id).await?;
            sink(ConsoleEvent::RunAdded { name: request.name.clone() });
            (run_id, false)
        }
    };

    let results = [NewResult {
        case_id: request.coverage_case_id,
        status_id: if request.results_failed { STATUS_FAILED } else { STATUS_PASSED },
        comment: request.report.clone(),
    }];
    let stored = client.add_results_for_cases(run_id, &results).await?;
    let acknowledged = !stored.is_empty();
    if acknowledged {
        sink(ConsoleEvent::ReportSent);
    }

    Ok(ReconcileOutcome { run_id, updated, acknowledged })
}

/// Reference-matching variant: one open run per reference string.
async fn reconcile_project_run(
    client: &TestRailClient,
    request: &ReconcileRequest,
    project_id: u32,
    sink: &ConsoleSink,
) -> ApiResult<(u32, bool)> {
    let runs = client.get_open_runs(project_id).await?;
    debug!(count = runs.len(), reference = %request.reference, "matching open runs");

    let existing =
        runs.into_iter().find(|run| run.refs.as_deref() == Some(request.reference.as_str()));

    match existing {
        Some(run) => {
            let tests = client.get_tests(run.id).await?;
            let mut case_ids: Vec<u32> = tests.into_iter().map(|test| test.case_id).collect();
            // TestRail accepts duplicate ids, so the coverage case is appended
            // without checking whether the run already includes it.
            case_ids.push(request.coverage_case_id);

            let delta = description_delta(request);
            let description =
                run.description.unwrap_or_default().replacen(&delta, "", 1) + &delta;

            client.update_run(run.id, &RunUpdate { description, case_ids }).await?;
            sink(ConsoleEvent::RunUpdated { name: request.name.clone() });
            Ok((run.id, true))
        }
        None => {
            let new_run = NewRun {
                suite_id: request.suite_id,
                include_all: false,
                case_ids: vec![request.coverage_case_id],
                name: request.name.clone(),
                description: effective_description(request).to_string(),
                refs: request.reference.clone(),
            };
            let run = client.add_run(project_id, &new_run).await?;
            sink(ConsoleEvent::RunAdded { name: request.name.clone() });
            Ok((run.id, false))
        }
    }
}

/// Plan variant: add an entry and report against its first run.
async fn append_plan_entry(
    client: &TestRailClient,
    request: &ReconcileRequest,
    plan_id: u32,
) -> ApiResult<u32> {
    let entry = NewPlanEntry {
        suite_id: request.suite_id,
        include_all: false,
        case_ids: vec![request.coverage_case_id],
        name: request.name.clone(),
        description: effective_description(request).to_string(),
    };
    let created = client.add_plan_entry(plan_id, &entry).await?;
    let run = created.runs.into_iter().next().ok_or_else(|| ApiError::InvalidResponse {
        message: format!("plan entry for plan {} came back without runs", plan_id),
    })?;
    Ok(run.id)
}

/// The text appended to run descriptions: the configured description, or the
/// rendered report when none was configured.
fn effective_description(request: &ReconcileRequest) -> &str {
    if request.description.is_empty() {
        &request.report
    } else {
        &request.description
    }
}

/// Update-path delta. The leading newline keeps appended blocks separated and
/// makes the removed-then-reappended occurrence unambiguous.
fn description_delta(request: &ReconcileRequest) -> String {
    format!("\n{}", effective_description(request))
}
