//! Request executor for the screening endpoint.
//!
//! One call to [`VeriaClient::screen`] issues exactly one `POST {base_url}/v1/screen`:
//!
//! ```text
//! caller --> screen(input)
//!              |  tokio::time::timeout(config.timeout(), exchange)
//!              v
//!            POST /v1/screen  {"input": "..."}
//!              |
//!              +-- timer fires first      --> Timeout        (request dropped)
//!              +-- transport failure      --> Network(msg)
//!              +-- non-2xx status         --> Api { code, message, status_code }
//!              +-- 2xx status             --> ScreeningResult
//! ```
//!
//! Nothing is retried or cached, and failures are not logged; the outcome goes straight
//! back to the caller.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{Result, ScreeningError, REQUEST_FAILED};
use crate::types::ScreeningResult;

const USER_AGENT: &str = concat!("veria-rs/", env!("CARGO_PKG_VERSION"));

/// Anything that can screen an address.
///
/// [`VeriaClient`] is the real implementation; callers can plug in their own for tests.
#[async_trait]
pub trait Screener: Send + Sync {
    async fn screen(&self, input: &str) -> Result<ScreeningResult>;
}

#[derive(Serialize)]
struct ScreenRequest<'a> {
    input: &'a str,
}

/// HTTP client for the screening service.
///
/// Cheap to clone and safe to share between tasks: the configuration never changes after
/// construction and each call owns its own request and timer.
#[derive(Debug, Clone)]
pub struct VeriaClient {
    http: Client,
    config: Arc<ClientConfig>,
    screen_url: String,
}

impl VeriaClient {
    /// Builds a client with its own connection pool.
    ///
    /// Fails with [`ScreeningError::MissingApiKey`] before touching the network if the key
    /// is blank.
    pub fn new(config: ClientConfig) -> Result<Self> {
        validate(&config)?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");
        Self::with_http_client(config, http)
    }

    /// Builds a client on top of an existing [`reqwest::Client`].
    pub fn with_http_client(config: ClientConfig, http: Client) -> Result<Self> {
        validate(&config)?;
        let screen_url = config.screen_url();

        debug!(
            url = %screen_url,
            timeout_ms = config.effective_timeout_ms(),
            "Screening client initialized"
        );

        Ok(Self {
            http,
            config: Arc::new(config),
            screen_url,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Screens one address-like identifier.
    ///
    /// The input is passed through untouched; format checks are the service's job.
    pub async fn screen(&self, input: &str) -> Result<ScreeningResult> {
        let timeout = self.config.timeout();
        debug!(
            url = %self.screen_url,
            timeout_ms = self.config.effective_timeout_ms(),
            "Dispatching screening request"
        );

        // Dropping the exchange future on expiry aborts the in-flight request; on early
        // completion the timer is dropped with the `Timeout` future.
        match tokio::time::timeout(timeout, self.exchange(input)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ScreeningError::Timeout),
        }
    }

    async fn exchange(&self, input: &str) -> Result<ScreeningResult> {
        let response = self
            .http
            .post(&self.screen_url)
            .bearer_auth(&self.config.api_key)
            .json(&ScreenRequest { input })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();

        if !status.is_success() {
            // An unreadable error body is classified like an empty one.
            let body = response.bytes().await.unwrap_or_default();
            return Err(classify_error_body(status, &body));
        }

        let body = response.bytes().await.map_err(transport_error)?;
        debug!(
            status = %status,
            body_len = body.len(),
            "Received screening response"
        );

        serde_json::from_slice(&body).map_err(|e| {
            ScreeningError::Network(format!("Failed to parse screening response: {}", e))
        })
    }
}

#[async_trait]
impl Screener for VeriaClient {
    async fn screen(&self, input: &str) -> Result<ScreeningResult> {
        VeriaClient::screen(self, input).await
    }
}

fn validate(config: &ClientConfig) -> Result<()> {
    if config.api_key.trim().is_empty() {
        return Err(ScreeningError::MissingApiKey);
    }
    Ok(())
}

/// Maps a reqwest failure that happened before a complete HTTP exchange.
fn transport_error(err: reqwest::Error) -> ScreeningError {
    if err.is_timeout() {
        return ScreeningError::Timeout;
    }

    // reqwest's own message is generic; the cause chain names the actual failure.
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !message.contains(&text) {
            message = format!("{}: {}", message, text);
        }
        source = cause.source();
    }

    if message.trim().is_empty() {
        message = "Unknown error".to_string();
    }
    ScreeningError::Network(message)
}

/// Turns a non-success response into a [`ScreeningError::Api`].
///
/// Accepts `{"error": {"code", "message"}}`, a bare `{"message"}`, or anything else
/// (including an empty or non-JSON body), and never fails itself.
pub fn classify_error_body(status: StatusCode, body: &[u8]) -> ScreeningError {
    let parsed: Value =
        serde_json::from_slice(body).unwrap_or_else(|_| Value::Object(Map::new()));
    let nested = parsed.get("error");

    let code = nested
        .and_then(|e| non_empty_str(e, "code"))
        .unwrap_or(REQUEST_FAILED)
        .to_string();

    let message = nested
        .and_then(|e| non_empty_str(e, "message"))
        .or_else(|| non_empty_str(&parsed, "message"))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

    ScreeningError::Api {
        code,
        message,
        status_code: status.as_u16(),
    }
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
