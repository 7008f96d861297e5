//! Wire types for the verification API.
//!
//! Everything here mirrors the JSON the service speaks: camelCase
//! field names, RFC 3339 timestamps (parsed straight into
//! [`chrono::DateTime<Utc>`]) and upper-case status values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::WireError;

/// Outer response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<WireError>,
    #[serde(default)]
    pub meta: Option<ResponseMeta>,
}

/// Envelope metadata: correlation id, server timestamp, rate limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rate_limit: Option<serde_json::Value>,
}

/// Delivery channel for a passcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    Whatsapp,
    Voice,
}

impl Default for Channel {
    fn default() -> Self {
        Channel::Sms
    }
}

/// Lifecycle state of an OTP request, as reported by the service.
///
/// Transitions happen server-side only: `Pending -> Sent` and then to
/// one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpStatus {
    Pending,
    Sent,
    Verified,
    Expired,
    Failed,
}

impl OtpStatus {
    /// Terminal states never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OtpStatus::Verified | OtpStatus::Expired | OtpStatus::Failed)
    }
}

/// Handle returned by a successful send or resend.
///
/// The caller owns storage of the `request_id`; the client keeps no
/// record of issued requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequest {
    pub request_id: String,
    pub expires_at: DateTime<Utc>,
    pub status: OtpStatus,
}

/// Outcome of a verification attempt.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResult {
    pub request_id: String,
    pub verified: bool,
    pub status: OtpStatus,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
}

/// Status of an OTP request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpStatusInfo {
    pub request_id: String,
    pub status: OtpStatus,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub channel: Option<Channel>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attempts: Option<u32>,
}

/// Status plus the plaintext code and provider metadata.
///
/// Only populated by the test-only status endpoint; see
/// [`crate::VeriwayClient::get_status_with_code`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpStatusWithCode {
    #[serde(flatten)]
    pub info: OtpStatusInfo,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub provider: Option<HashMap<String, serde_json::Value>>,
}

/// Server-provided SDK configuration.
///
/// Known fields are typed; everything else is kept in `extra` so new
/// server keys survive a round through this client unchanged.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkConfig {
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default)]
    pub default_channel: Option<Channel>,
    #[serde(default)]
    pub test_phone_numbers: Vec<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Point-in-time copy of the server configuration.
///
/// Replaced wholesale on refresh; config and fetch time always travel
/// together so readers never observe a half-updated cache entry.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    pub config: SdkConfig,
    pub fetched_at: DateTime<Utc>,
}

impl ConfigSnapshot {
    /// True once the snapshot is older than `ttl_secs`.
    pub fn is_stale(&self, ttl_secs: i64) -> bool {
        (Utc::now() - self.fetched_at).num_seconds() >= ttl_secs
    }
}

/// Body of the send-OTP call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpBody {
    pub phone_number: String,
    pub channel: Channel,
    pub ttl_seconds: u32,
    pub code_length: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Body of the verify-OTP call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpBody {
    pub request_id: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}
