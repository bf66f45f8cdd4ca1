//! LLM error types.

use thiserror::Error;
use tracing::{error, warn};

/// Errors that can occur when making LLM API calls.
#[derive(Debug, Error)]
pub enum LLMError {
    /// Credential variable is not set
    #[error("missing credential: {var} is not set")]
    MissingCredential { var: String },

    /// HTTP request failed
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned an error response
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Rate limited (429)
    #[error(
        "rate limited{}",
        .retry_after.map(|s| format!(" (retry after {s}s)")).unwrap_or_default()
    )]
    RateLimit { retry_after: Option<u64> },

    /// API answered successfully but carried no reply text
    #[error("response contained no reply")]
    EmptyResponse,
}

/// Check an HTTP response for rate-limit errors, returning `RateLimit` for 429.
pub fn check_response_error(response: &reqwest::Response) -> Option<LLMError> {
    if response.status().is_success() {
        return None;
    }
    if response.status().as_u16() == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        warn!(?retry_after, "rate limited by provider");
        return Some(LLMError::RateLimit { retry_after });
    }
    None
}

/// Consume a non-2xx response into an `Api` error, logging the body.
pub async fn api_error(provider: &str, response: reqwest::Response) -> LLMError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    error!(provider, status, body = %message, "api request failed");
    LLMError::Api { status, message }
}

/// Log a transport failure and hand it back for propagation.
pub fn request_error(provider: &str, err: reqwest::Error) -> LLMError {
    error!(provider, error = %err, "error in api request");
    LLMError::Request(err)
}
