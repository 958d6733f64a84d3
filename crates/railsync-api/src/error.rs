//! Error types for the TestRail client.

/// TestRail API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The service answered with a non-2xx status.
    #[error("{url} returned {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    /// Transport-level failure (DNS, TLS, connection, timeout).
    #[error("network error: {message}")]
    Network { message: String },

    /// The body did not decode as the expected shape.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for TestRail operations.
pub type ApiResult<T> = Result<T, ApiError>;
