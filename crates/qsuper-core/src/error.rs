//! Error types for the qsuper core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors surfaced by the request builder, the codec and the client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A setter received a malformed or out-of-domain value.
    ///
    /// The request state is left unchanged.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation was invoked while required fields are missing.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// A numeric literal could not be interpreted as an exact number.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The remote call failed or returned a non-2xx status.
    #[error("Transport error{}: {message}", status_suffix(.status))]
    Transport {
        /// HTTP status, if the service answered at all.
        status: Option<u16>,
        /// Failure description.
        message: String,
    },

    /// The response body lacked an expected field or had the wrong shape.
    #[error("Decode error: {0}")]
    Decode(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

impl CoreError {
    /// Shorthand for [`CoreError::InvalidArgument`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Shorthand for [`CoreError::Precondition`].
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Shorthand for [`CoreError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Whether the error was raised before any network activity.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::Precondition(_) | Self::Parse(_)
        )
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
