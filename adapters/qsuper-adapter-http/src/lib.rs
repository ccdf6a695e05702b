//! qsuper HTTP transport
//!
//! Carries request payloads to the superposition service over HTTPS.
//!
//! # Wire contract
//!
//! One `POST` per operation. By default the payload is wrapped for the API
//! gateway as `{"body": "<payload JSON text>"}`; [`WireEnvelope::Plain`]
//! sends the payload as-is. Responses are returned untouched and unwrapped by
//! [`qsuper_core::result::extract_response`].
//!
//! # Retries and timeouts
//!
//! | Setting | Default | Env override |
//! |---------|---------|--------------|
//! | endpoint | [`DEFAULT_ENDPOINT`] | `QSUPER_ENDPOINT` |
//! | connect timeout | 10 s | |
//! | timeout per attempt | 600 s | `QSUPER_TIMEOUT_SECS` |
//! | retries | 5 | `QSUPER_MAX_RETRIES` |
//! | backoff | 0.5 s doubling, capped at 30 s | |
//!
//! Statuses 500, 502, 503, 504, connect errors and timeouts are retried.
//! The payload is serialized once and the same bytes are replayed.
//!
//! # Example
//!
//! ```ignore
//! use qsuper_adapter_http::{HttpTransport, TransportConfig};
//! use qsuper_core::SuperposeClient;
//!
//! let transport = HttpTransport::with_config(TransportConfig::from_env()?)?;
//! let mut client = SuperposeClient::with_token(std::env::var("QSUPER_TOKEN")?, transport)?;
//! ```

mod config;
mod error;
mod transport;

pub use config::{
    DEFAULT_ENDPOINT, ENDPOINT_ENV, MAX_RETRIES_ENV, TIMEOUT_ENV, TransportConfig, WireEnvelope,
};
pub use error::{HttpError, HttpResult};
pub use transport::{HttpTransport, encode_body, is_retryable_status};
