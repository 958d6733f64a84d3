//! Configuration resolution for the reporter.
//!
//! Three layered sources, highest precedence first: process environment
//! (`TESTRAIL_*` variables), explicit construction options, and a
//! `.testrailrc` JSON file in the working directory. Numeric identifiers
//! accept prefixed forms (`P123`, `S45`, `R7`, `C1024`); a value that fails
//! to parse resolves to unset rather than erroring.
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `TESTRAIL_ENABLED` | enables reporting when exactly `"true"` |
//! | `TESTRAIL_HOST` | service base URL |
//! | `TESTRAIL_USER` / `TESTRAIL_API_KEY` | Basic-auth credentials |
//! | `TESTRAIL_PROJECT_ID` / `TESTRAIL_SUITE_ID` / `TESTRAIL_PLAN_ID` / `TESTRAIL_COVERAGE_CASE_ID` | identifiers, optionally `P`/`S`/`R`/`C` prefixed |
//! | `TESTRAIL_RUN_NAME` / `TESTRAIL_RUN_DESCRIPTION` / `TESTRAIL_REFERENCE` | templates (`%BRANCH%`, `%BUILD%`, `%DATE%`) |
//! | `TESTRAIL_BRANCH_ENV` / `TESTRAIL_BUILD_NO_ENV` | names of *other* variables holding branch / build number |
//! | `TESTRAIL_DATE_FORMAT` | strftime pattern for `%DATE%` |
//! | `TESTRAIL_RUN_CLOSE_AFTER_DAYS` | auto-close threshold carried for API consumers |

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

/// File probed in the working directory when no explicit path is given.
pub const RC_FILE_NAME: &str = ".testrailrc";

/// Default run-name template.
pub const DEFAULT_RUN_NAME: &str = "%BRANCH%#%BUILD% - %DATE%";

/// Default strftime pattern for `%DATE%`.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default reference template when a plan id selects plan mode.
pub const PLAN_REFERENCE_DEFAULT: &str = "%BRANCH%#%BUILD%";

const DEFAULT_BRANCH_ENV: &str = "BRANCH";
const DEFAULT_BUILD_NO_ENV: &str = "BUILD_NUMBER";

/// Raised only in strict mode: the rc file was required but unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not readable: {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("config file is not valid JSON: {path}: {message}")]
    Invalid { path: String, message: String },
}

/// Immutable snapshot of the variables resolution consults.
///
/// Injectable so resolution stays deterministic under test; [`process`]
/// captures the real environment once.
///
/// [`process`]: Environment::process
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Snapshot the process environment.
    pub fn process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build from explicit pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            vars: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

/// Identifier as it appears in config sources: a bare number or a string
/// with an optional service prefix.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    /// Positive identifier, or `None` for zero/garbage. The prefix letter is
    /// removed at its first occurrence; anything left unparseable is unset.
    fn as_id(&self, prefix: Option<char>) -> Option<u32> {
        match self {
            Self::Number(n) => u32::try_from(*n).ok().filter(|id| *id > 0),
            Self::Text(s) => parse_id(s, prefix),
        }
    }
}

impl From<u32> for RawId {
    fn from(n: u32) -> Self {
        Self::Number(u64::from(n))
    }
}

impl From<&str> for RawId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// One partial configuration layer: the rc file, or explicit options.
/// All fields optional; unknown keys in the file are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialConfig {
    pub enabled: Option<bool>,
    pub host: Option<String>,
    pub user: Option<String>,
    pub api_key: Option<String>,
    pub project_id: Option<RawId>,
    pub suite_id: Option<RawId>,
    pub plan_id: Option<RawId>,
    pub coverage_case_id: Option<RawId>,
    pub run_name: Option<String>,
    pub run_description: Option<String>,
    pub reference: Option<String>,
    pub branch_env: Option<String>,
    pub build_no_env: Option<String>,
    pub date_format: Option<String>,
    pub run_close_after_days: Option<RawId>,
}

impl PartialConfig {
    /// Overlay `other` on `self`; fields present in `other` win.
    pub fn merged_with(&self, other: &PartialConfig) -> PartialConfig {
        PartialConfig {
            enabled: other.enabled.or(self.enabled),
            host: other.host.clone().or_else(|| self.host.clone()),
            user: other.user.clone().or_else(|| self.user.clone()),
            api_key: other.api_key.clone().or_else(|| self.api_key.clone()),
            project_id: other.project_id.clone().or_else(|| self.project_id.clone()),
            suite_id: other.suite_id.clone().or_else(|| self.suite_id.clone()),
            plan_id: other.plan_id.clone().or_else(|| self.plan_id.clone()),
            coverage_case_id: other
                .coverage_case_id
                .clone()
                .or_else(|| self.coverage_case_id.clone()),
            run_name: other.run_name.clone().or_else(|| self.run_name.clone()),
            run_description: other
                .run_description
                .clone()
                .or_else(|| self.run_description.clone()),
            reference: other.reference.clone().or_else(|| self.reference.clone()),
            branch_env: other.branch_env.clone().or_else(|| self.branch_env.clone()),
            build_no_env: other
                .build_no_env
                .clone()
                .or_else(|| self.build_no_env.clone()),
            date_format: other
                .date_format
                .clone()
                .or_else(|| self.date_format.clone()),
            run_close_after_days: other
                .run_close_after_days
                .clone()
                .or_else(|| self.run_close_after_days.clone()),
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_project_id(mut self, id: impl Into<RawId>) -> Self {
        self.project_id = Some(id.into());
        self
    }

    pub fn with_suite_id(mut self, id: impl Into<RawId>) -> Self {
        self.suite_id = Some(id.into());
        self
    }

    pub fn with_plan_id(mut self, id: impl Into<RawId>) -> Self {
        self.plan_id = Some(id.into());
        self
    }

    pub fn with_coverage_case_id(mut self, id: impl Into<RawId>) -> Self {
        self.coverage_case_id = Some(id.into());
        self
    }

    pub fn with_run_name(mut self, run_name: impl Into<String>) -> Self {
        self.run_name = Some(run_name.into());
        self
    }

    pub fn with_run_description(mut self, run_description: impl Into<String>) -> Self {
        self.run_description = Some(run_description.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_branch_env(mut self, branch_env: impl Into<String>) -> Self {
        self.branch_env = Some(branch_env.into());
        self
    }

    pub fn with_build_no_env(mut self, build_no_env: impl Into<String>) -> Self {
        self.build_no_env = Some(build_no_env.into());
        self
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = Some(date_format.into());
        self
    }

    pub fn with_run_close_after_days(mut self, days: impl Into<RawId>) -> Self {
        self.run_close_after_days = Some(days.into());
        self
    }
}

/// How runs are located and created on the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Match open project runs by reference; update in place or create.
    Reference,
    /// Append a fresh run to an existing plan via a plan entry.
    Plan,
}

/// Fully resolved configuration, immutable for the reporter's lifetime.
///
/// Every identifier is either a positive integer or `None`; prefixed raw
/// strings never survive resolution.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub enabled: bool,
    pub host: String,
    pub user: String,
    pub api_key: String,
    pub project_id: Option<u32>,
    pub suite_id: Option<u32>,
    pub plan_id: Option<u32>,
    pub coverage_case_id: Option<u32>,
    pub run_name: String,
    pub run_description: String,
    pub reference: String,
    pub branch_env: String,
    pub build_no_env: String,
    pub date_format: String,
    /// Carried for API consumers; no reporter operation consumes it.
    pub run_close_after_days: Option<u32>,
    pub mode: ReconcileMode,
}

/// Load one rc file layer. Lenient mode treats a missing, empty, or
/// malformed file as an empty layer; strict mode fails on anything but a
/// parseable file (an empty file still counts as empty config).
pub fn load_file_config(path: &Path, strict: bool) -> Result<PartialConfig, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if !strict => {
            debug!(path = %path.display(), error = %err, "no rc file, continuing with empty config");
            return Ok(PartialConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Unreadable {
                path: path.display().to_string(),
                message: err.to_string(),
            })
        }
    };

    if text.trim().is_empty() {
        return Ok(PartialConfig::default());
    }

    match serde_json::from_str(&text) {
        Ok(config) => Ok(config),
        Err(err) if !strict => {
            warn!(path = %path.display(), error = %err, "malformed rc file ignored");
            Ok(PartialConfig::default())
        }
        Err(err) => Err(ConfigError::Invalid {
            path: path.display().to_string(),
            message: err.to_string(),
        }),
    }
}

/// Merge the three layers into an [`EffectiveConfig`].
///
/// Precedence per field, highest first: environment variable, explicit
/// option, file value, hardcoded default. Empty environment values fall
/// through, as do empty strings from the lower layers when a non-empty
/// default exists. `enabled` is true iff `TESTRAIL_ENABLED` equals `"true"`
/// or a lower layer set it. A resolved plan id selects
/// [`ReconcileMode::Plan`] and with it the plan-mode reference default.
pub fn resolve(file: &PartialConfig, overrides: &PartialConfig, env: &Environment) -> EffectiveConfig {
    let merged = file.merged_with(overrides);

    let plan_id = pick_id(env, "TESTRAIL_PLAN_ID", merged.plan_id, Some('R'));
    let mode = if plan_id.is_some() {
        ReconcileMode::Plan
    } else {
        ReconcileMode::Reference
    };
    let reference_default = match mode {
        ReconcileMode::Reference => "",
        ReconcileMode::Plan => PLAN_REFERENCE_DEFAULT,
    };

    EffectiveConfig {
        enabled: env.get("TESTRAIL_ENABLED") == Some("true") || merged.enabled.unwrap_or(false),
        host: pick_string(env, "TESTRAIL_HOST", merged.host, ""),
        user: pick_string(env, "TESTRAIL_USER", merged.user, ""),
        api_key: pick_string(env, "TESTRAIL_API_KEY", merged.api_key, ""),
        project_id: pick_id(env, "TESTRAIL_PROJECT_ID", merged.project_id, Some('P')),
        suite_id: pick_id(env, "TESTRAIL_SUITE_ID", merged.suite_id, Some('S')),
        plan_id,
        coverage_case_id: pick_id(
            env,
            "TESTRAIL_COVERAGE_CASE_ID",
            merged.coverage_case_id,
            Some('C'),
        ),
        run_name: pick_string(env, "TESTRAIL_RUN_NAME", merged.run_name, DEFAULT_RUN_NAME),
        run_description: pick_string(env, "TESTRAIL_RUN_DESCRIPTION", merged.run_description, ""),
        reference: pick_string(env, "TESTRAIL_REFERENCE", merged.reference, reference_default),
        branch_env: pick_string(env, "TESTRAIL_BRANCH_ENV", merged.branch_env, DEFAULT_BRANCH_ENV),
        build_no_env: pick_string(
            env,
            "TESTRAIL_BUILD_NO_ENV",
            merged.build_no_env,
            DEFAULT_BUILD_NO_ENV,
        ),
        date_format: pick_string(env, "TESTRAIL_DATE_FORMAT", merged.date_format, DEFAULT_DATE_FORMAT),
        run_close_after_days: pick_id(
            env,
            "TESTRAIL_RUN_CLOSE_AFTER_DAYS",
            merged.run_close_after_days,
            None,
        ),
        mode,
    }
}

fn pick_string(env: &Environment, var: &str, merged: Option<String>, default: &str) -> String {
    if let Some(value) = env.get(var) {
        if !value.is_empty() {
            return value.to_string();
        }
    }
    match merged {
        Some(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

fn pick_id(env: &Environment, var: &str, merged: Option<RawId>, prefix: Option<char>) -> Option<u32> {
    match env.get(var) {
        Some(value) if !value.is_empty() => parse_id(value, prefix),
        _ => merged.and_then(|raw| raw.as_id(prefix)),
    }
}

fn parse_id(raw: &str, prefix: Option<char>) -> Option<u32> {
    let cleaned = match prefix {
        Some(p) => raw.replacen(p, "", 1),
        None => raw.to_string(),
    };
    cleaned.trim().parse::<u32>().ok().filter(|id| *id > 0)
}
