//! LLM error types

use std::fmt;

/// Error type for LLM operations
#[derive(Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network/connection error
    Connection(String),

    /// API error (authentication, bad request, server error)
    Api { status: u16, message: String },

    /// Provider not configured or not available
    ProviderUnavailable(String),

    /// Request timeout
    Timeout,

    /// Invalid request (bad parameters, bad model selection)
    InvalidRequest(String),

    /// Rate limited
    RateLimited { retry_after: Option<u64> },

    /// Response did not have the expected shape
    MalformedResponse(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::Connection(msg) => write!(f, "Connection error: {}", msg),
            LlmError::Api { status, message } => {
                write!(f, "API error ({}): {}", status, message)
            }
            LlmError::ProviderUnavailable(provider) => {
                write!(f, "Provider unavailable: {}", provider)
            }
            LlmError::Timeout => write!(f, "Request timed out"),
            LlmError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            LlmError::RateLimited { retry_after } => {
                if let Some(seconds) = retry_after {
                    write!(f, "Rate limited, retry after {} seconds", seconds)
                } else {
                    write!(f, "Rate limited")
                }
            }
            LlmError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            LlmError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for LlmError {}

impl From<ureq::Error> for LlmError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                if status == 429 {
                    let retry_after = response
                        .header("retry-after")
                        .and_then(|v| v.trim().parse().ok());
                    return LlmError::RateLimited { retry_after };
                }
                if status == 401 || status == 403 {
                    return LlmError::Api {
                        status,
                        message: "Authentication failed".to_string(),
                    };
                }
                let body = response
                    .into_string()
                    .unwrap_or_else(|_| "Unknown error".to_string());
                LlmError::Api {
                    status,
                    message: api_error_message(&body),
                }
            }
            ureq::Error::Transport(transport) => {
                let text = transport.to_string();
                if text.contains("timed out") {
                    LlmError::Timeout
                } else {
                    LlmError::Connection(text)
                }
            }
        }
    }
}

impl From<std::io::Error> for LlmError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::TimedOut {
            LlmError::Timeout
        } else {
            LlmError::Internal(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::MalformedResponse(format!("JSON error: {}", err))
    }
}

/// Pull `error.message` out of a JSON error body, falling back to the raw body
pub(crate) fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|e| e.get("message").or(Some(e)))
                .and_then(|m| m.as_str())
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| body.trim().to_string())
}
