use thiserror::Error;

/// Failures surfaced by an engine or the provider beneath it.
///
/// No variant is retried anywhere in this crate; classification exists so
/// callers can implement their own policy per kind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Malformed response: {0}")]
    ResponseFormat(String),

    #[error("Timed out after {0}s")]
    Timeout(u64),
}

fn is_network_error(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout() || (err.status().is_none() && err.is_request())
}

impl From<reqwest::Error> for EngineError {
    fn from(error: reqwest::Error) -> Self {
        if is_network_error(&error) {
            let msg = if error.is_timeout() {
                "Request timed out — check your network connection and try again.".to_string()
            } else if let Some(url) = error.url() {
                match url.host_str() {
                    Some(host) => format!(
                        "Could not connect to {} — check your network connection and try again.",
                        host
                    ),
                    None => "Could not connect to the provider — check your network connection and try again.".to_string(),
                }
            } else {
                "Network error — check your network connection and try again.".to_string()
            };
            return EngineError::NetworkError(msg);
        }

        let msg = match error.status() {
            Some(status) => format!("{} (status: {})", error, status),
            None => error.to_string(),
        };
        EngineError::RequestFailed(msg)
    }
}
