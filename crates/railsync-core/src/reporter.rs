//! Host-facing reporter façade.
//!
//! The host test runner constructs one [`Reporter`] and calls
//! [`Reporter::on_run_complete`] once per finished run. The completion call
//! never returns an error: every failure is reported through the console
//! sink and swallowed, so a broken TestRail setup cannot fail the build.

use std::path::PathBuf;

use chrono::Local;
use railsync_api::{ApiResult, TestRailClient};
use tracing::debug;

use crate::config::{
    load_file_config, resolve, ConfigError, EffectiveConfig, Environment, PartialConfig,
    RC_FILE_NAME,
};
use crate::console::{standard_sink, ConsoleEvent, ConsoleSink, MissingField};
use crate::reconcile::{reconcile, ReconcileOutcome, ReconcileRequest, RunTarget};
use crate::report::format_report;
use crate::results::RunSummary;
use crate::template::{expand_reference, expand_run_name, resolve_branch, resolve_build};

/// Construction-time options for [`Reporter`].
#[derive(Clone)]
pub struct ReporterOptions {
    /// Explicit option layer; beats the rc file, loses to environment
    /// variables.
    pub overrides: PartialConfig,

    /// Location of the rc file.
    pub config_path: PathBuf,

    /// Fail construction on a missing or malformed rc file instead of
    /// treating it as empty.
    pub strict_config_file: bool,

    /// Environment the resolver and templater read from.
    pub environment: Environment,

    /// Console sink for the user-visible lines.
    pub console: ConsoleSink,
}

impl Default for ReporterOptions {
    fn default() -> Self {
        ReporterOptions {
            overrides: PartialConfig::default(),
            config_path: PathBuf::from(RC_FILE_NAME),
            strict_config_file: false,
            environment: Environment::process(),
            console: standard_sink(),
        }
    }
}

impl ReporterOptions {
    pub fn with_overrides(mut self, overrides: PartialConfig) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    pub fn with_strict_config_file(mut self, strict: bool) -> Self {
        self.strict_config_file = strict;
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_console(mut self, console: ConsoleSink) -> Self {
        self.console = console;
        self
    }
}

/// Identifiers that survived verification.
struct VerifiedIds {
    project_id: u32,
    suite_id: u32,
    coverage_case_id: u32,
}

/// Reports one completed test run to TestRail.
pub struct Reporter {
    config: EffectiveConfig,
    branch: String,
    build: String,
    console: ConsoleSink,
}

impl Reporter {
    /// Resolves configuration and captures the branch/build labels.
    ///
    /// The only fallible path is the rc file in strict mode; a lenient
    /// reporter always constructs.
    pub fn new(options: ReporterOptions) -> Result<Self, ConfigError> {
        let file = load_file_config(&options.config_path, options.strict_config_file)?;
        let config = resolve(&file, &options.overrides, &options.environment);
        let branch = resolve_branch(&options.environment, &config);
        let build = resolve_build(&options.environment, &config);
        debug!(enabled = config.enabled, mode = ?config.mode, branch = %branch, "reporter configured");

        Ok(Reporter { config, branch, build, console: options.console })
    }

    /// The resolved configuration this reporter runs with.
    pub fn config(&self) -> &EffectiveConfig {
        &self.config
    }

    /// Reports the finished run. Disabled or incompletely configured
    /// reporters return without touching the network.
    pub async fn on_run_complete(&self, results: &RunSummary) {
        if !self.config.enabled {
            return;
        }
        let Some(ids) = self.verify_config() else {
            return;
        };

        if let Err(error) = self.send_report(&ids, results).await {
            self.emit(ConsoleEvent::SendFailed { error: error.to_string() });
        }
    }

    /// Emits one diagnostic per missing required field, in a fixed order,
    /// and yields the identifiers only when every field is present.
    fn verify_config(&self) -> Option<VerifiedIds> {
        let config = &self.config;

        if config.host.is_empty() {
            self.emit(ConsoleEvent::Missing(MissingField::Host));
        }
        if config.user.is_empty() || config.api_key.is_empty() {
            self.emit(ConsoleEvent::Missing(MissingField::Credentials));
        }
        if config.project_id.is_none() {
            self.emit(ConsoleEvent::Missing(MissingField::ProjectId));
        }
        if config.coverage_case_id.is_none() {
            self.emit(ConsoleEvent::Missing(MissingField::CoverageCaseId));
        }
        if config.suite_id.is_none() {
            self.emit(ConsoleEvent::Missing(MissingField::SuiteId));
        }

        if config.host.is_empty() || config.user.is_empty() || config.api_key.is_empty() {
            return None;
        }
        match (config.project_id, config.suite_id, config.coverage_case_id) {
            (Some(project_id), Some(suite_id), Some(coverage_case_id)) => {
                Some(VerifiedIds { project_id, suite_id, coverage_case_id })
            }
            _ => None,
        }
    }

    async fn send_report(
        &self,
        ids: &VerifiedIds,
        results: &RunSummary,
    ) -> ApiResult<ReconcileOutcome> {
        let client =
            TestRailClient::new(&self.config.host, &self.config.user, &self.config.api_key)?;

        let now = Local::now().naive_local();
        let name = expand_run_name(&self.config, &self.branch, &self.build, now);
        let reference = expand_reference(&self.config, &self.branch, &self.build);
        let report = format_report(results);

        let target = match self.config.plan_id {
            Some(plan_id) => RunTarget::Plan { plan_id },
            None => RunTarget::Project { project_id: ids.project_id },
        };

        let request = ReconcileRequest {
            target,
            suite_id: ids.suite_id,
            coverage_case_id: ids.coverage_case_id,
            name,
            reference,
            description: self.config.run_description.clone(),
            report,
            results_failed: results.failed(),
        };

        reconcile(&client, &request, &self.console).await
    }

    fn emit(&self, event: ConsoleEvent) {
        (self.console)(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::capture_sink;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct ApiOp(String);

    fn api_op(op: impl Into<String>) -> ApiOp {
        ApiOp(op.into())
    }

    impl wiremock::Match for ApiOp {
        fn matches(&self, request: &wiremock::Request) -> bool {
            match request.url.query() {
                Some(q) => q == self.0 || q.starts_with(&format!("{}&", self.0)),
                None => false,
            }
        }
    }

    fn complete_overrides(host: &str) -> PartialConfig {
        PartialConfig::default()
            .with_enabled(true)
            .with_host(host)
            .with_user("qa@example.com")
            .with_api_key("key")
            .with_project_id(1_u32)
            .with_suite_id(7_u32)
            .with_coverage_case_id(901_u32)
            .with_run_name("%BRANCH%#%BUILD% smoke")
    }

    fn options(overrides: PartialConfig) -> (ReporterOptions, crate::console::CapturedEvents) {
        let (sink, events) = capture_sink();
        let options = ReporterOptions::default()
            .with_overrides(overrides)
            .with_config_path("/nonexistent/.testrailrc")
            .with_environment(Environment::from_pairs(&[
                ("BRANCH", "main"),
                ("BUILD_NUMBER", "42"),
            ]))
            .with_console(sink);
        (options, events)
    }

    #[tokio::test]
    async fn disabled_reporter_emits_nothing() {
        let overrides = complete_overrides("http://127.0.0.1:9").with_enabled(false);
        let (options, events) = options(overrides);

        let reporter = Reporter::new(options).expect("construction failed");
        reporter.on_run_complete(&RunSummary::default()).await;

        assert!(events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn enabled_but_empty_config_logs_five_diagnostics() {
        let (options, events) = options(PartialConfig::default().with_enabled(true));

        let reporter = Reporter::new(options).expect("construction failed");
        reporter.on_run_complete(&RunSummary::default()).await;

        let events = events.lock().unwrap();
        let expected = [
            MissingField::Host,
            MissingField::Credentials,
            MissingField::ProjectId,
            MissingField::CoverageCaseId,
            MissingField::SuiteId,
        ];
        assert_eq!(events.len(), expected.len());
        for (event, field) in events.iter().zip(expected) {
            assert_eq!(*event, ConsoleEvent::Missing(field));
        }
    }

    #[tokio::test]
    async fn only_missing_fields_are_reported() {
        let overrides = PartialConfig::default()
            .with_enabled(true)
            .with_host("https://qa.testrail.example")
            .with_user("qa@example.com")
            .with_api_key("key")
            .with_project_id(1_u32);
        let (options, events) = options(overrides);

        let reporter = Reporter::new(options).expect("construction failed");
        reporter.on_run_complete(&RunSummary::default()).await;

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                ConsoleEvent::Missing(MissingField::CoverageCaseId),
                ConsoleEvent::Missing(MissingField::SuiteId),
            ]
        );
    }

    #[tokio::test]
    async fn full_cycle_creates_run_and_sends_result() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/index.php"))
            .and(api_op("/api/v2/get_runs/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/index.php"))
            .and(api_op("/api/v2/add_run/1"))
            .and(body_partial_json(serde_json::json!({
                "suite_id": 7,
                "include_all": false,
                "case_ids": [901],
                "name": "main#42 smoke",
                "refs": ""
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(
                {"id": 1201, "name": "main#42 smoke"}
            )))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/index.php"))
            .and(api_op("/api/v2/add_results_for_cases/1201"))
            .and(body_partial_json(serde_json::json!({
                "results": [{"case_id": 901, "status_id": 1}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "test_id": 1, "status_id": 1}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let (options, events) = options(complete_overrides(&server.uri()));
        let reporter = Reporter::new(options).expect("construction failed");
        reporter.on_run_complete(&RunSummary::default()).await;

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                ConsoleEvent::RunAdded { name: "main#42 smoke".to_string() },
                ConsoleEvent::ReportSent,
            ]
        );
    }

    #[tokio::test]
    async fn plan_id_routes_to_plan_entry() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/index.php"))
            .and(api_op("/api/v2/add_plan_entry/55"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "entry-1",
                "name": "main#42 smoke",
                "runs": [{"id": 777, "name": "main#42 smoke"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/index.php"))
            .and(api_op("/api/v2/add_results_for_cases/777"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "test_id": 1, "status_id": 1}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(path("/index.php"))
            .and(api_op("/api/v2/get_runs/1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let overrides = complete_overrides(&server.uri()).with_plan_id(55_u32);
        let (options, events) = options(overrides);

        let reporter = Reporter::new(options).expect("construction failed");
        reporter.on_run_complete(&RunSummary::default()).await;

        assert_eq!(events.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failure_emits_exactly_one_error_line() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/index.php"))
            .and(api_op("/api/v2/get_runs/1"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"error": "Field :project_id is not valid"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (options, events) = options(complete_overrides(&server.uri()));
        let reporter = Reporter::new(options).expect("construction failed");
        reporter.on_run_complete(&RunSummary { failed_tests: 3, ..RunSummary::default() }).await;

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ConsoleEvent::SendFailed { error } => {
                assert!(error.contains("400"));
                assert!(error.contains("Field :project_id is not valid"));
            }
            other => panic!("expected SendFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn strict_mode_surfaces_missing_rc_file() {
        let options = ReporterOptions::default()
            .with_config_path("/nonexistent/.testrailrc")
            .with_strict_config_file(true)
            .with_environment(Environment::from_pairs(&[]));

        assert!(Reporter::new(options).is_err());
    }

    #[test]
    fn environment_beats_override_layer() {
        let environment = Environment::from_pairs(&[("TESTRAIL_PROJECT_ID", "P9")]);
        let options = ReporterOptions::default()
            .with_overrides(complete_overrides("https://qa.testrail.example"))
            .with_config_path("/nonexistent/.testrailrc")
            .with_environment(environment);

        let reporter = Reporter::new(options).expect("construction failed");
        assert_eq!(reporter.config().project_id, Some(9));
    }
}
