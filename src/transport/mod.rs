//! HTTP transport: header assembly, envelope handling, error
//! translation and the retry state machine.
//!
//! Every request goes out with the identification headers the service
//! relies on for observability; caller-supplied custom headers never
//! override them. Failure responses are translated into
//! [`ApiError`](crate::errors::ApiError) at this boundary, so callers
//! above only ever see the closed taxonomy (or a `Connection` fault
//! when the service was never reached).

mod executor;

pub use executor::{HttpExecutor, HttpMethod, HttpRequest, HttpResponse, ReqwestExecutor};

use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::errors::{ApiError, Error, Result};
use crate::types::ApiEnvelope;

/// Header carrying the client-generated deduplication token.
pub const IDEMPOTENCY_HEADER: &str = "X-Idempotency-Key";

pub struct Transport<E: HttpExecutor> {
    executor: E,
    config: Arc<ClientConfig>,
}

impl<E: HttpExecutor> Transport<E> {
    pub fn new(executor: E, config: Arc<ClientConfig>) -> Self {
        Transport { executor, config }
    }

    /// Perform a non-retried request. Used for reads (status, config,
    /// health); callers wanting retry on reads do it at their level.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let request = self.build_request(method, path, body, None);
        let value = self.execute_once(request).await?;
        decode(value)
    }

    /// Perform a mutating request with bounded exponential-backoff
    /// retry.
    ///
    /// Retries happen only for errors the taxonomy marks retryable,
    /// waiting 1 s, 2 s, 4 s, ... between attempts, and always resend
    /// the identical body under the identical idempotency key. The key
    /// is what lets the service deduplicate; regenerating it per
    /// attempt would turn a retry into a second delivery.
    pub async fn request_with_retry<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
        idempotency_key: &str,
    ) -> Result<T> {
        let max_attempts = self.config.max_retries.max(1);
        let mut attempt: u32 = 1;
        loop {
            debug!(
                attempt,
                max_attempts,
                path,
                idempotency_key,
                "sending request"
            );
            let request =
                self.build_request(method, path, body.clone(), Some(idempotency_key));
            match self.execute_once(request).await {
                Ok(value) => return decode(value),
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let delay = backoff_delay(attempt);
                    warn!(
                        attempt,
                        delay_secs = delay.as_secs(),
                        error = %err,
                        "retryable failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Assemble URL and headers for one request.
    ///
    /// Custom headers go in first so the identification set wins any
    /// name collision.
    fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
        idempotency_key: Option<&str>,
    ) -> HttpRequest {
        let mut headers: Vec<(String, String)> = Vec::new();
        for (name, value) in &self.config.custom_headers {
            set_header(&mut headers, name, value);
        }
        set_header(&mut headers, "Content-Type", "application/json");
        set_header(&mut headers, "X-API-Key", &self.config.api_key);
        set_header(&mut headers, "X-SDK-Version", &self.config.sdk_version);
        set_header(&mut headers, "X-SDK-Platform", &self.config.platform);
        set_header(&mut headers, "X-SDK-Language", &self.config.language);
        if let Some(key) = idempotency_key {
            set_header(&mut headers, IDEMPOTENCY_HEADER, key);
        }

        HttpRequest {
            method,
            url: format!(
                "{}{}",
                self.config.base_url.trim_end_matches('/'),
                path
            ),
            headers,
            body,
        }
    }

    /// One attempt: execute, unwrap the envelope, translate errors.
    async fn execute_once(&self, request: HttpRequest) -> Result<serde_json::Value> {
        let response = self.executor.execute(request).await?;
        let status = response.status;

        let Some(body) = response.body else {
            // An error status without a structured body still counts as
            // a service answer; a garbled success body does not.
            if status >= 400 {
                return Err(Error::Api(ApiError::from_status(status)));
            }
            return Err(Error::Connection(format!(
                "Service returned HTTP {} with a non-JSON body",
                status
            )));
        };

        let envelope: ApiEnvelope = match serde_json::from_value(body) {
            Ok(envelope) => envelope,
            Err(_) if status >= 400 => {
                return Err(Error::Api(ApiError::from_status(status)));
            }
            Err(e) => {
                return Err(Error::Connection(format!(
                    "Unrecognized response envelope: {}",
                    e
                )));
            }
        };

        if envelope.success {
            Ok(envelope.data.unwrap_or(serde_json::Value::Null))
        } else {
            let request_id = envelope.meta.and_then(|m| m.request_id);
            match envelope.error {
                Some(error) => Err(Error::Api(ApiError::from_wire(error, request_id))),
                None => Err(Error::Api(ApiError::from_status(status))),
            }
        }
    }
}

/// Delay before re-attempting: 1 s, 2 s, 4 s, ... doubling per
/// attempt. The exponent is capped so an extreme `max_retries`
/// setting cannot overflow the shift; the delay plateaus instead.
pub(crate) fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << (attempt - 1).min(16))
}

/// Replace-or-append a header by case-insensitive name.
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    if let Some(entry) = headers
        .iter_mut()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
    {
        entry.1 = value.to_string();
    } else {
        headers.push((name.to_string(), value.to_string()));
    }
}

fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::Connection(format!("Failed to decode response payload: {}", e)))
}

/// Serialize a request body. Failure here is a programming error in
/// this crate, surfaced as an error rather than a panic.
pub(crate) fn encode<T: serde::Serialize>(body: &T) -> Result<serde_json::Value> {
    serde_json::to_value(body)
        .map_err(|e| Error::Connection(format!("Failed to encode request body: {}", e)))
}

#[cfg(test)]
pub(crate) mod tests;
