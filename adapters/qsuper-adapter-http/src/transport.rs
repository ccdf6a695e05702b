//! reqwest-backed [`Transport`].

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use qsuper_core::{CoreResult, Payload, Transport};

use crate::config::{TransportConfig, WireEnvelope};
use crate::error::{HttpError, HttpResult};

/// Statuses worth another attempt.
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

/// Encode `payload` as the request body for `envelope`.
pub fn encode_body(payload: &Payload, envelope: WireEnvelope) -> HttpResult<Vec<u8>> {
    match envelope {
        WireEnvelope::Plain => Ok(serde_json::to_vec(payload)?),
        WireEnvelope::Gateway => {
            let inner = serde_json::to_string(payload)?;
            Ok(serde_json::to_vec(&serde_json::json!({ "body": inner }))?)
        }
    }
}

/// POSTs payloads to the service, retrying transient failures.
pub struct HttpTransport {
    /// HTTP client with timeouts configured.
    client: Client,
    config: TransportConfig,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Transport with the default configuration.
    pub fn new() -> HttpResult<Self> {
        Self::with_config(TransportConfig::default())
    }

    /// Transport with an explicit configuration.
    pub fn with_config(config: TransportConfig) -> HttpResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(HttpError::Http)?;
        Ok(Self { client, config })
    }

    /// Active configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// POST `body` to the endpoint, replaying the same bytes on retry.
    ///
    /// The whole exchange, retries and backoff included, is bounded by
    /// [`TransportConfig::timeout`].
    #[instrument(skip(self, body), fields(endpoint = %self.config.endpoint))]
    pub async fn post_json(&self, body: Vec<u8>) -> HttpResult<Value> {
        let budget = self.config.timeout;
        match tokio::time::timeout(budget, self.post_with_retries(body)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout = ?budget, "Request timed out");
                Err(HttpError::Timeout(budget))
            }
        }
    }

    async fn post_with_retries(&self, body: Vec<u8>) -> HttpResult<Value> {
        let attempts = self.config.attempts();
        let mut last = String::new();

        for attempt in 0..attempts {
            if attempt > 0 {
                let backoff = self.config.backoff(attempt);
                warn!(
                    attempt = attempt + 1,
                    "Retrying after transient failure (backoff {:?})", backoff
                );
                tokio::time::sleep(backoff).await;
            }

            debug!("POST {}", self.config.endpoint);
            let sent = self
                .client
                .post(&self.config.endpoint)
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone())
                .send()
                .await;

            let resp = match sent {
                Ok(resp) => resp,
                Err(e) if is_transient(&e) => {
                    warn!(error = %e, "Transient request failure");
                    last = e.to_string();
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = resp.status();
            if status.is_success() {
                let text = resp.text().await?;
                return Ok(serde_json::from_str(&text)?);
            }

            let message = resp.text().await.unwrap_or_default();
            if is_retryable_status(status) && attempt + 1 < attempts {
                warn!(status = status.as_u16(), "Transient service failure");
                last = format!("status {status}");
                continue;
            }
            return Err(HttpError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Err(HttpError::RetriesExhausted { attempts, last })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn submit(&self, payload: &Payload) -> CoreResult<Value> {
        let body = encode_body(payload, self.config.envelope)?;
        Ok(self.post_json(body).await?)
    }
}
