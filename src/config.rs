use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.veria.cc";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

const SCREEN_PATH: &str = "/v1/screen";

/// Settings for a [`VeriaClient`](crate::VeriaClient).
///
/// Read-only once the client is built. The API key is validated by the client
/// constructor, not here, so a config loaded from a file may still be incomplete.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Bearer credential sent with every request
    #[serde(default)]
    pub api_key: String,
    /// Service root, without the `/v1/screen` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upper bound for one whole request/response exchange
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Zero is not a usable bound and falls back to [`DEFAULT_TIMEOUT_MS`].
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.with_timeout_ms(millis)
    }

    /// `timeout_ms` with the zero fallback applied.
    pub fn effective_timeout_ms(&self) -> u64 {
        match self.timeout_ms {
            0 => DEFAULT_TIMEOUT_MS,
            ms => ms,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.effective_timeout_ms())
    }

    pub fn screen_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), SCREEN_PATH)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("ClientConfig")
            .field("api_key", &api_key)
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}
