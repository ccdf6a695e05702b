//! Transport configuration.

use std::time::Duration;

use crate::error::{HttpError, HttpResult};

/// Production service endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://jkv6ys0nv6.execute-api.eu-west-1.amazonaws.com/test";

/// Environment variable overriding the endpoint.
pub const ENDPOINT_ENV: &str = "QSUPER_ENDPOINT";
/// Environment variable overriding the retry budget.
pub const MAX_RETRIES_ENV: &str = "QSUPER_MAX_RETRIES";
/// Environment variable overriding the total timeout, in seconds.
pub const TIMEOUT_ENV: &str = "QSUPER_TIMEOUT_SECS";

/// How the payload is wrapped on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireEnvelope {
    /// `{"body": "<payload as JSON text>"}`, as the API gateway expects.
    #[default]
    Gateway,
    /// The payload itself is the request body.
    Plain,
}

/// Endpoint, timeouts and retry policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Service URL.
    pub endpoint: String,
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
    /// Time budget of one call: every attempt, response body and backoff.
    pub timeout: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub backoff_base: Duration,
    /// Upper bound on a single backoff delay.
    pub backoff_max: Duration,
    /// Request envelope.
    pub envelope: WireEnvelope,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(600),
            max_retries: 5,
            backoff_base: Duration::from_millis(500),
            backoff_max: Duration::from_secs(30),
            envelope: WireEnvelope::Gateway,
        }
    }
}

impl TransportConfig {
    /// Defaults overridden by `QSUPER_ENDPOINT`, `QSUPER_MAX_RETRIES` and
    /// `QSUPER_TIMEOUT_SECS` when set.
    pub fn from_env() -> HttpResult<Self> {
        let mut config = Self::default();
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            config.endpoint = endpoint;
        }
        if let Ok(raw) = std::env::var(MAX_RETRIES_ENV) {
            config.max_retries = raw
                .trim()
                .parse()
                .map_err(|_| HttpError::Config(format!("{MAX_RETRIES_ENV}: not a number: {raw}")))?;
        }
        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| HttpError::Config(format!("{TIMEOUT_ENV}: not a number: {raw}")))?;
            config.timeout = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }

    /// Set the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the total timeout of one call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the backoff base and cap.
    pub fn with_backoff(mut self, base: Duration, max: Duration) -> Self {
        self.backoff_base = base;
        self.backoff_max = max;
        self
    }

    /// Set the request envelope.
    pub fn with_envelope(mut self, envelope: WireEnvelope) -> Self {
        self.envelope = envelope;
        self
    }

    /// Check the endpoint scheme and timeout ordering.
    pub fn validate(&self) -> HttpResult<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(HttpError::Config(format!(
                "endpoint must be an http(s) URL: {}",
                self.endpoint
            )));
        }
        if self.connect_timeout > self.timeout {
            return Err(HttpError::Config(
                "connect timeout exceeds total timeout".into(),
            ));
        }
        Ok(())
    }

    /// Total attempts, including the first one.
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.backoff_base
            .checked_mul(factor)
            .map_or(self.backoff_max, |d| d.min(self.backoff_max))
    }
}
