//! Placeholder expansion for run names and references.
//!
//! Names may carry `%BRANCH%`, `%BUILD%`, and `%DATE%`; references only the
//! first two. Each placeholder is substituted once, at its first occurrence.

use chrono::NaiveDateTime;

use crate::config::{EffectiveConfig, Environment, DEFAULT_DATE_FORMAT};

const FALLBACK_BRANCH: &str = "master";
const FALLBACK_BUILD: &str = "unknown";

/// Branch label taken from the variable named by `branch_env`.
pub fn resolve_branch(env: &Environment, config: &EffectiveConfig) -> String {
    non_empty(env.get(&config.branch_env)).unwrap_or(FALLBACK_BRANCH).to_string()
}

/// Build label taken from the variable named by `build_no_env`.
pub fn resolve_build(env: &Environment, config: &EffectiveConfig) -> String {
    non_empty(env.get(&config.build_no_env)).unwrap_or(FALLBACK_BUILD).to_string()
}

/// Expands the configured run name for a run executed at `now`.
pub fn expand_run_name(
    config: &EffectiveConfig,
    branch: &str,
    build: &str,
    now: NaiveDateTime,
) -> String {
    let date = format_date(now, &config.date_format);
    config
        .run_name
        .replacen("%BRANCH%", branch, 1)
        .replacen("%BUILD%", build, 1)
        .replacen("%DATE%", &date, 1)
}

/// Expands the configured reference, or returns an empty string when no
/// reference is configured. `%DATE%` is not a reference placeholder.
pub fn expand_reference(config: &EffectiveConfig, branch: &str, build: &str) -> String {
    if config.reference.is_empty() {
        return String::new();
    }
    config.reference.replacen("%BRANCH%", branch, 1).replacen("%BUILD%", build, 1)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Formats `now` with the configured strftime pattern. A pattern chrono
/// rejects must not bring the reporter down with it, so rendering errors fall
/// back to the default pattern.
fn format_date(now: NaiveDateTime, pattern: &str) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    if write!(out, "{}", now.format(pattern)).is_err() {
        out.clear();
        let _ = write!(out, "{}", now.format(DEFAULT_DATE_FORMAT));
    }
    out
}
