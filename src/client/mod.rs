//! The client: high-level operations over the transport.
//!
//! [`VeriwayClient`] validates inputs locally, generates idempotency
//! keys for mutating calls, coerces wire timestamps into
//! [`chrono::DateTime<Utc>`] values and keeps a time-boxed cache of
//! the server-provided SDK configuration. It holds no other state:
//! OTP request lifecycle lives entirely on the server, and the caller
//! owns storage of request ids.

mod idempotency;
mod validation;


pub use idempotency::generate_idempotency_key;
pub use validation::{is_valid_phone_number, mask_phone};

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::errors::Result;
use crate::transport::{HttpExecutor, HttpMethod, ReqwestExecutor, Transport};
use crate::types::{
    Channel, ConfigSnapshot, OtpRequest, OtpStatusInfo, OtpStatusWithCode, SdkConfig,
    SendOtpBody, VerifyOtpBody, VerifyOtpResult,
};

/// How long a fetched SDK configuration stays fresh.
const CONFIG_TTL_SECS: i64 = 3600;

/// Options for [`VeriwayClient::send_otp`].
#[derive(Debug, Clone)]
pub struct SendOtpOptions {
    /// Delivery channel, SMS by default.
    pub channel: Channel,
    /// Passcode lifetime in seconds.
    pub ttl_seconds: u32,
    /// Number of digits in the passcode.
    pub code_length: u8,
    /// Free-form metadata stored with the request server-side.
    pub metadata: Option<serde_json::Value>,
    /// Explicit idempotency key; one is generated when absent.
    pub idempotency_key: Option<String>,
}

impl Default for SendOtpOptions {
    fn default() -> Self {
        SendOtpOptions {
            channel: Channel::Sms,
            ttl_seconds: 300,
            code_length: 6,
            metadata: None,
            idempotency_key: None,
        }
    }
}

/// Options for [`VeriwayClient::verify_otp`].
#[derive(Debug, Clone, Default)]
pub struct VerifyOtpOptions {
    /// End-user IP, forwarded for the service's fraud checks.
    pub ip_address: Option<String>,
    /// End-user agent string, same purpose.
    pub user_agent: Option<String>,
}

/// Client for the Veriway phone verification API.
pub struct VeriwayClient<E: HttpExecutor = ReqwestExecutor> {
    transport: Transport<E>,
    config_cache: RwLock<Option<ConfigSnapshot>>,
}

impl VeriwayClient<ReqwestExecutor> {
    /// Create a client with default configuration.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(api_key))
    }

    /// Create a client from an explicit configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let config = Arc::new(config);
        let executor = ReqwestExecutor::new(&config)?;
        Ok(Self::with_executor(executor, config))
    }

    /// Create a client from `VERIWAY_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }
}

impl<E: HttpExecutor> VeriwayClient<E> {
    /// Create a client over a custom executor. The main consumer is
    /// tests, but any [`HttpExecutor`] impl works.
    pub fn with_executor(executor: E, config: Arc<ClientConfig>) -> Self {
        VeriwayClient {
            transport: Transport::new(executor, config),
            config_cache: RwLock::new(None),
        }
    }

    /// Request a passcode delivery to `phone_number`.
    ///
    /// The number must already be strict E.164; malformed input fails
    /// locally without touching the network. Returns the handle the
    /// caller passes to [`verify_otp`](Self::verify_otp) and
    /// [`get_status`](Self::get_status).
    pub async fn send_otp(
        &self,
        phone_number: &str,
        options: SendOtpOptions,
    ) -> Result<OtpRequest> {
        validation::validate_phone_number(phone_number)?;

        let idempotency_key = options
            .idempotency_key
            .unwrap_or_else(generate_idempotency_key);
        let body = SendOtpBody {
            phone_number: phone_number.to_string(),
            channel: options.channel,
            ttl_seconds: options.ttl_seconds,
            code_length: options.code_length,
            metadata: options.metadata,
        };

        info!(
            phone = %validation::mask_phone(phone_number),
            channel = ?options.channel,
            "requesting OTP delivery"
        );
        let handle: OtpRequest = self
            .transport
            .request_with_retry(
                HttpMethod::Post,
                "/otp/send",
                Some(crate::transport::encode(&body)?),
                &idempotency_key,
            )
            .await?;
        debug!(request_id = %handle.request_id, "OTP request created");
        Ok(handle)
    }

    /// Check a passcode against an open request.
    ///
    /// Deliberately single-shot: retrying a failed verify would burn
    /// the subject's attempt budget.
    pub async fn verify_otp(
        &self,
        request_id: &str,
        code: &str,
        options: VerifyOtpOptions,
    ) -> Result<VerifyOtpResult> {
        validation::validate_request_id(request_id)?;
        validation::validate_code(code)?;

        let body = VerifyOtpBody {
            request_id: request_id.to_string(),
            code: code.to_string(),
            ip_address: options.ip_address,
            user_agent: options.user_agent,
        };
        self.transport
            .request(
                HttpMethod::Post,
                "/otp/verify",
                Some(crate::transport::encode(&body)?),
            )
            .await
    }

    /// Re-deliver the passcode for an open request.
    ///
    /// A resend is a new delivery, not a replay, so it always gets a
    /// fresh idempotency key.
    pub async fn resend_otp(&self, request_id: &str) -> Result<OtpRequest> {
        validation::validate_request_id(request_id)?;
        let idempotency_key = generate_idempotency_key();
        self.transport
            .request_with_retry(
                HttpMethod::Post,
                &format!("/otp/{}/resend", request_id),
                None,
                &idempotency_key,
            )
            .await
    }

    /// Fetch the current status of a request.
    pub async fn get_status(&self, request_id: &str) -> Result<OtpStatusInfo> {
        validation::validate_request_id(request_id)?;
        self.transport
            .request(
                HttpMethod::Get,
                &format!("/otp/{}/status", request_id),
                None,
            )
            .await
    }

    /// Fetch status including the plaintext code and provider details.
    ///
    /// **Test and development only.** The endpoint exposes the code
    /// itself; production code must never call this.
    pub async fn get_status_with_code(&self, request_id: &str) -> Result<OtpStatusWithCode> {
        validation::validate_request_id(request_id)?;
        self.transport
            .request(
                HttpMethod::Get,
                &format!("/otp/{}/status-with-code", request_id),
                None,
            )
            .await
    }

    /// Return the server-provided SDK configuration.
    ///
    /// Served from a single-entry cache for up to an hour;
    /// `force_refresh` bypasses the cache. The cached snapshot is
    /// replaced wholesale, never merged.
    pub async fn get_config(&self, force_refresh: bool) -> Result<SdkConfig> {
        if !force_refresh {
            let cache = self.config_cache.read().await;
            if let Some(snapshot) = cache.as_ref() {
                if !snapshot.is_stale(CONFIG_TTL_SECS) {
                    return Ok(snapshot.config.clone());
                }
            }
        }

        let config: SdkConfig = self
            .transport
            .request(HttpMethod::Get, "/sdk/config", None)
            .await?;
        if config.test_mode {
            warn!("Veriway is running in test mode; no real messages will be delivered");
        }

        let snapshot = ConfigSnapshot {
            config: config.clone(),
            fetched_at: chrono::Utc::now(),
        };
        *self.config_cache.write().await = Some(snapshot);
        Ok(config)
    }

    /// Lightweight connectivity probe. Never errors.
    pub async fn test_connection(&self) -> bool {
        match self
            .transport
            .request::<serde_json::Value>(HttpMethod::Get, "/health", None)
            .await
        {
            Ok(_) => true,
            Err(err) => {
                debug!(error = %err, "connectivity test failed");
                false
            }
        }
    }

    /// Whether the service reports test mode. `false` on any failure.
    pub async fn is_test_mode(&self) -> bool {
        match self.get_config(false).await {
            Ok(config) => config.test_mode,
            Err(err) => {
                debug!(error = %err, "config fetch failed, assuming live mode");
                false
            }
        }
    }
}
