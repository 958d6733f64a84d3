use std::io::Read;
use std::path::Path;

use anyhow::Context;
use railsync_core::{PartialConfig, Reporter, ReporterOptions, RunSummary};
use tracing::debug;

use super::args::{Cli, Command, ReportArgs};
use crate::exit_codes::SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Report(args) => report(args).await,
    }
}

/// Runs one completion cycle for the given results summary. A send failure
/// is written to the console by the reporter and does not change the exit
/// code; only local setup problems bubble up.
async fn report(args: ReportArgs) -> anyhow::Result<i32> {
    let results = read_summary(&args.results)?;
    debug!(total_tests = results.total_tests, failed_tests = results.failed_tests, "summary read");

    let reporter = Reporter::new(
        ReporterOptions::default()
            .with_overrides(overrides_from(&args))
            .with_config_path(&args.config)
            .with_strict_config_file(args.strict_config),
    )?;
    reporter.on_run_complete(&results).await;

    Ok(SUCCESS)
}

fn read_summary(path: &Path) -> anyhow::Result<RunSummary> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read results from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read results from {}", path.display()))?
    };
    serde_json::from_str(&text).context("failed to parse results summary")
}

fn overrides_from(args: &ReportArgs) -> PartialConfig {
    let mut overrides = PartialConfig::default();
    if args.enabled {
        overrides = overrides.with_enabled(true);
    }
    if let Some(host) = &args.host {
        overrides = overrides.with_host(host.clone());
    }
    if let Some(user) = &args.user {
        overrides = overrides.with_user(user.clone());
    }
    if let Some(api_key) = &args.api_key {
        overrides = overrides.with_api_key(api_key.clone());
    }
    if let Some(id) = &args.project_id {
        overrides = overrides.with_project_id(id.as_str());
    }
    if let Some(id) = &args.suite_id {
        overrides = overrides.with_suite_id(id.as_str());
    }
    if let Some(id) = &args.plan_id {
        overrides = overrides.with_plan_id(id.as_str());
    }
    if let Some(id) = &args.coverage_case_id {
        overrides = overrides.with_coverage_case_id(id.as_str());
    }
    if let Some(run_name) = &args.run_name {
        overrides = overrides.with_run_name(run_name.clone());
    }
    if let Some(run_description) = &args.run_description {
        overrides = overrides.with_run_description(run_description.clone());
    }
    if let Some(reference) = &args.reference {
        overrides = overrides.with_reference(reference.clone());
    }
    overrides
}
