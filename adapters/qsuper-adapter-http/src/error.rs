//! Error types for the HTTP transport.

use std::time::Duration;

use thiserror::Error;

use qsuper_core::CoreError;

/// Result type for HTTP transport operations.
pub type HttpResult<T> = Result<T, HttpError>;

/// Errors that can occur when talking to the service over HTTP.
#[derive(Debug, Error)]
pub enum HttpError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Service answered with a non-success status.
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// Transient failures persisted through every retry.
    #[error("Giving up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    /// The call did not finish within the total timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid transport configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HttpError {
    /// HTTP status attached to the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<HttpError> for CoreError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Json(err) => CoreError::Decode(err.to_string()),
            other => CoreError::Transport {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}
