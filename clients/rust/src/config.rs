use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 10 << 20;

pub const ENV_BASE_URL: &str = "API_BASE_URL";
pub const ENV_TOKEN: &str = "API_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "API_TIMEOUT_SECS";

/// Settings for a [`Client`](crate::Client). Passed explicitly at
/// construction; nothing is read from process state after that.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
    pub max_response_bytes: usize,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("max_response_bytes", &self.max_response_bytes)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_HTTP_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = limit;
        self
    }

    /// Reads `API_BASE_URL`, `API_TOKEN` and `API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_BASE_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::invalid_url(format!("{ENV_BASE_URL} is not set")))?;
        let mut config = Self::new(base_url.trim());
        if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.is_empty()) {
            config.token = Some(token);
        }
        match lookup(ENV_TIMEOUT_SECS).map(|v| v.trim().parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => config.timeout = Duration::from_secs(secs),
            Some(_) => {
                tracing::warn!(
                    var = ENV_TIMEOUT_SECS,
                    default_secs = DEFAULT_HTTP_TIMEOUT.as_secs(),
                    "ignoring invalid timeout, using default"
                );
            }
            None => {}
        }
        Ok(config)
    }
}
