//! Client configuration.
//!
//! A [`ClientConfig`] is built once, handed to the client, and never
//! mutated afterwards. Identification values (SDK version, platform,
//! language) live here rather than in module statics so two clients
//! with different identities can coexist in one process.

use std::collections::HashMap;
use std::time::Duration;

use crate::errors::{ApiError, Error};

/// Default API base address.
pub const DEFAULT_BASE_URL: &str = "https://api.veriway.com/v1";
/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default maximum attempts for retryable mutating calls.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Immutable configuration for a [`crate::VeriwayClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API credential, sent as `X-API-Key`.
    pub api_key: String,
    /// Base address of the verification API, without trailing slash.
    pub base_url: String,
    /// Timeout applied to each network attempt.
    pub timeout: Duration,
    /// Maximum attempts for retryable mutating calls.
    pub max_retries: u32,
    /// Extra headers attached to every request. Identification headers
    /// win on name collision.
    pub custom_headers: HashMap<String, String>,
    /// Value of the `X-SDK-Version` identification header.
    pub sdk_version: String,
    /// Value of the `X-SDK-Platform` identification header.
    pub platform: String,
    /// Value of the `X-SDK-Language` identification header.
    pub language: String,
}

impl ClientConfig {
    /// Create a configuration with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        ClientConfig {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            custom_headers: HashMap::new(),
            sdk_version: env!("CARGO_PKG_VERSION").to_string(),
            platform: "server".to_string(),
            language: "rust".to_string(),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `VERIWAY_API_KEY` (required), `VERIWAY_BASE_URL`,
    /// `VERIWAY_TIMEOUT_SECS` and `VERIWAY_MAX_RETRIES`.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("VERIWAY_API_KEY").map_err(|_| {
            Error::Api(ApiError::validation("VERIWAY_API_KEY not set"))
        })?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("VERIWAY_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(secs) = std::env::var("VERIWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = std::env::var("VERIWAY_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.max_retries = retries;
        }
        Ok(config)
    }

    /// Set the base URL, trimming any trailing slash.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let url: String = base_url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum attempts for retryable calls.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Attach a header to every outgoing request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(name.into(), value.into());
        self
    }
}
