//! Core reporting pipeline: configuration, report rendering, and run
//! reconciliation against TestRail.
//!
//! The crate is driven through one façade:
//!
//! - [`Reporter::new`] resolves configuration from an rc file, explicit
//!   options, and the environment
//! - [`Reporter::on_run_complete`] renders the report, locates or creates
//!   the matching run, and attaches the coverage result
//!
//! Completion never fails the host build: every service failure is written
//! to the console sink and swallowed.
//!
//! # Quick Start
//!
//! ```no_run
//! use railsync_core::{Reporter, ReporterOptions, RunSummary};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let reporter = Reporter::new(ReporterOptions::default())?;
//!
//! let results: RunSummary = serde_json::from_str(r#"{"numTotalTests": 12}"#)?;
//! reporter.on_run_complete(&results).await;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! Each field resolves environment variable → explicit option → rc file →
//! default. The recognized variables:
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `TESTRAIL_ENABLED` | Enable reporting (literal `"true"`) |
//! | `TESTRAIL_HOST` | TestRail instance, e.g. `https://qa.testrail.example` |
//! | `TESTRAIL_USER` / `TESTRAIL_API_KEY` | Credentials for HTTP basic auth |
//! | `TESTRAIL_PROJECT_ID` | Project (optional `P` prefix) |
//! | `TESTRAIL_SUITE_ID` | Suite (optional `S` prefix) |
//! | `TESTRAIL_PLAN_ID` | Plan (optional `R` prefix); presence selects plan mode |
//! | `TESTRAIL_COVERAGE_CASE_ID` | Case receiving the result (optional `C` prefix) |
//! | `TESTRAIL_RUN_NAME` | Run name template (default `%BRANCH%#%BUILD% - %DATE%`) |
//! | `TESTRAIL_RUN_DESCRIPTION` | Fixed run description |
//! | `TESTRAIL_REFERENCE` | Reference template (correlation key) |
//! | `TESTRAIL_BRANCH_ENV` / `TESTRAIL_BUILD_NO_ENV` | Names of the variables holding branch and build |
//! | `TESTRAIL_DATE_FORMAT` | strftime pattern for `%DATE%` |
//! | `TESTRAIL_RUN_CLOSE_AFTER_DAYS` | Retention hint, carried through unused |

pub mod config;
pub mod console;
pub mod reconcile;
pub mod report;
pub mod reporter;
pub mod results;
pub mod template;

pub use config::{
    load_file_config, resolve, ConfigError, EffectiveConfig, Environment, PartialConfig, RawId,
    ReconcileMode, DEFAULT_DATE_FORMAT, DEFAULT_RUN_NAME, PLAN_REFERENCE_DEFAULT, RC_FILE_NAME,
};
pub use console::{standard_sink, ConsoleEvent, ConsoleSink, MissingField};
pub use reconcile::{reconcile, ReconcileOutcome, ReconcileRequest, RunTarget};
pub use report::format_report;
pub use reporter::{Reporter, ReporterOptions};
pub use results::{CoverageStat, CoverageSummary, RunSummary};
pub use template::{expand_reference, expand_run_name, resolve_branch, resolve_build};
