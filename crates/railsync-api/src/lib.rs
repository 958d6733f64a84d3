//! TestRail API v2 client.
//!
//! Thin typed wrapper over the handful of endpoints the reporter drives:
//!
//! - `get_runs` / `get_tests` for locating an open run and its cases
//! - `add_run` / `update_run` for creating or reconciling a run
//! - `add_plan_entry` for plan-scoped runs
//! - `add_results_for_cases` for attaching the report result
//!
//! All requests authenticate with HTTP Basic (user + API key) against the
//! `{host}/index.php?/api/v2/...` URL scheme TestRail exposes. Status-code
//! mapping lives in one place inside [`client`]; callers only ever see
//! [`ApiError`].
//!
//! # Quick Start
//!
//! ```no_run
//! use railsync_api::TestRailClient;
//!
//! # async fn example() -> railsync_api::ApiResult<()> {
//! let client = TestRailClient::new("https://example.testrail.io", "user", "api-key")?;
//! let runs = client.get_open_runs(42).await?;
//! println!("{} open runs", runs.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::TestRailClient;
pub use error::{ApiError, ApiResult};
pub use types::{
    CaseResult, NewPlanEntry, NewResult, NewRun, PlanEntry, Run, RunUpdate, Test, STATUS_FAILED,
    STATUS_PASSED,
};
