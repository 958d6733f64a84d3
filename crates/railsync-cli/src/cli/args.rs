use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "railsync",
    version,
    about = "Report test-runner results to TestRail runs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Report one completed test run from a results summary
    Report(ReportArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ReportArgs {
    /// Results summary JSON; `-` reads stdin
    #[arg(default_value = "-")]
    pub results: PathBuf,

    /// rc file location
    #[arg(long, default_value = ".testrailrc")]
    pub config: PathBuf,

    /// Fail on a missing or malformed rc file instead of ignoring it
    #[arg(long)]
    pub strict_config: bool,

    /// Enable reporting without consulting TESTRAIL_ENABLED
    #[arg(long)]
    pub enabled: bool,

    /// TestRail instance, e.g. https://qa.testrail.example
    #[arg(long)]
    pub host: Option<String>,

    /// Account email
    #[arg(long)]
    pub user: Option<String>,

    /// API key for HTTP basic auth
    #[arg(long)]
    pub api_key: Option<String>,

    /// Project id (optional P prefix)
    #[arg(long)]
    pub project_id: Option<String>,

    /// Suite id (optional S prefix)
    #[arg(long)]
    pub suite_id: Option<String>,

    /// Plan id (optional R prefix); when set, runs are added to this plan
    #[arg(long)]
    pub plan_id: Option<String>,

    /// Case the coverage result is recorded against (optional C prefix)
    #[arg(long)]
    pub coverage_case_id: Option<String>,

    /// Run name template; %BRANCH%, %BUILD%, and %DATE% are substituted
    #[arg(long)]
    pub run_name: Option<String>,

    /// Fixed run description
    #[arg(long)]
    pub run_description: Option<String>,

    /// Reference template; %BRANCH% and %BUILD% are substituted
    #[arg(long)]
    pub reference: Option<String>,
}
