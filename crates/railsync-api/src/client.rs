//! TestRail client. All HTTP/status mapping happens in [`TestRailClient::send`];
//! endpoint methods never interpret status codes themselves.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::types::{
    CaseResult, NewPlanEntry, NewResult, NewRun, PlanEntry, Run, RunUpdate, RunsResponse, Test,
    TestsResponse,
};

const USER_AGENT_VALUE: &str = concat!("railsync/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the TestRail API v2, authenticating every request with
/// HTTP Basic (user + API key).
#[derive(Debug, Clone)]
pub struct TestRailClient {
    http: reqwest::Client,
    base_url: String,
    user: String,
    api_key: String,
}

impl TestRailClient {
    /// Build a client for `host` (e.g. `https://example.testrail.io`).
    pub fn new(host: &str, user: &str, api_key: &str) -> ApiResult<Self> {
        Self::with_timeout(host, user, api_key, DEFAULT_TIMEOUT)
    }

    /// Same as [`new`](Self::new) with an explicit request timeout.
    pub fn with_timeout(
        host: &str,
        user: &str,
        api_key: &str,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| ApiError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: host.trim_end_matches('/').to_string(),
            user: user.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Runs under `project_id` that are not completed yet.
    pub async fn get_open_runs(&self, project_id: u32) -> ApiResult<Vec<Run>> {
        let url = self.api_url(&format!("get_runs/{}&is_completed=0", project_id));
        debug!(url = %url, "fetching open runs");

        let response = self.get(&url).await?;
        let runs: RunsResponse =
            response
                .json()
                .await
                .map_err(|e| ApiError::InvalidResponse {
                    message: format!("failed to parse run list: {}", e),
                })?;
        Ok(runs.into_runs())
    }

    /// Test entries of an existing run.
    pub async fn get_tests(&self, run_id: u32) -> ApiResult<Vec<Test>> {
        let url = self.api_url(&format!("get_tests/{}", run_id));
        debug!(url = %url, "fetching run tests");

        let response = self.get(&url).await?;
        let tests: TestsResponse =
            response
                .json()
                .await
                .map_err(|e| ApiError::InvalidResponse {
                    message: format!("failed to parse test list: {}", e),
                })?;
        Ok(tests.into_tests())
    }

    /// Create a run under `project_id`.
    pub async fn add_run(&self, project_id: u32, run: &NewRun) -> ApiResult<Run> {
        let url = self.api_url(&format!("add_run/{}", project_id));
        debug!(url = %url, name = %run.name, "creating run");

        let response = self.post(&url, run).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse {
                message: format!("failed to parse created run: {}", e),
            })
    }

    /// Update an existing run's description and case list.
    pub async fn update_run(&self, run_id: u32, update: &RunUpdate) -> ApiResult<Run> {
        let url = self.api_url(&format!("update_run/{}", run_id));
        debug!(url = %url, cases = update.case_ids.len(), "updating run");

        let response = self.post(&url, update).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse {
                message: format!("failed to parse updated run: {}", e),
            })
    }

    /// Append an entry (and its run) to an existing plan.
    pub async fn add_plan_entry(&self, plan_id: u32, entry: &NewPlanEntry) -> ApiResult<PlanEntry> {
        let url = self.api_url(&format!("add_plan_entry/{}", plan_id));
        debug!(url = %url, name = %entry.name, "adding plan entry");

        let response = self.post(&url, entry).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse {
                message: format!("failed to parse plan entry: {}", e),
            })
    }

    /// Attach results to cases of a run.
    pub async fn add_results_for_cases(
        &self,
        run_id: u32,
        results: &[NewResult],
    ) -> ApiResult<Vec<CaseResult>> {
        #[derive(Serialize)]
        struct Payload<'a> {
            results: &'a [NewResult],
        }

        let url = self.api_url(&format!("add_results_for_cases/{}", run_id));
        debug!(url = %url, count = results.len(), "adding results");

        let response = self.post(&url, &Payload { results }).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse {
                message: format!("failed to parse stored results: {}", e),
            })
    }

    // TestRail routes everything through index.php; the endpoint path rides
    // in the query string, extra parameters join with '&'.
    fn api_url(&self, op: &str) -> String {
        format!("{}/index.php?/api/v2/{}", self.base_url, op)
    }

    async fn get(&self, url: &str) -> ApiResult<reqwest::Response> {
        self.send(self.http.get(url), url).await
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> ApiResult<reqwest::Response> {
        self.send(self.http.post(url).json(body), url).await
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> ApiResult<reqwest::Response> {
        let response = request
            .basic_auth(&self.user, Some(&self.api_key))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            message: error_message(&body, status),
        })
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// TestRail error bodies are usually `{"error": "..."}`; fall back to the raw
/// body, then to the status line.
fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(ErrorBody {
        error: Some(message),
    }) = serde_json::from_str::<ErrorBody>(body)
    {
        return message;
    }
    if body.is_empty() {
        status.to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_scheme() {
        let client =
            TestRailClient::new("https://example.testrail.io/", "u", "k").expect("client");
        assert_eq!(
            client.api_url("get_tests/7"),
            "https://example.testrail.io/index.php?/api/v2/get_tests/7"
        );
    }

    #[test]
    fn test_error_message_from_json_body() {
        let message = error_message(
            r#"{"error": "Field :suite_id is not a valid suite."}"#,
            reqwest::StatusCode::BAD_REQUEST,
        );
        assert_eq!(message, "Field :suite_id is not a valid suite.");
    }

    #[test]
    fn test_error_message_from_plain_body() {
        let message = error_message("Service Unavailable", reqwest::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(message, "Service Unavailable");
    }

    #[test]
    fn test_error_message_from_empty_body() {
        let message = error_message("", reqwest::StatusCode::UNAUTHORIZED);
        assert_eq!(message, "401 Unauthorized");
    }
}
