//! Structured service errors and the wire error-code mapping.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Closed set of error codes the verification service can return.
///
/// The mapping from wire code strings is exhaustive on our side: codes
/// this enum does not know yet degrade to [`ErrorCode::Unknown`]
/// (non-retryable) instead of failing, so a server rollout that adds
/// new codes never breaks existing callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    AuthenticationFailed,
    InvalidApiKey,
    ApiKeyRevoked,
    InvalidPhoneNumber,
    PhoneNumberBlocked,
    OtpExpired,
    MaxAttemptsExceeded,
    InvalidOtp,
    RequestNotFound,
    AlreadyVerified,
    RateLimitExceeded,
    InsufficientBalance,
    PaymentRequired,
    BrandNotConfigured,
    BrandNotAuthorized,
    BrandPendingApproval,
    BrandCreationFailed,
    SmsSendFailed,
    ProviderUnavailable,
    ValidationError,
    MissingField,
    InternalServerError,
    ServiceUnavailable,
    IdempotencyConflict,
    /// Fallback for wire codes this client version does not know.
    Unknown,
}

impl ErrorCode {
    /// Parse a wire code string. Unrecognized codes become `Unknown`.
    pub fn from_wire_code(code: &str) -> Self {
        match code {
            "AUTHENTICATION_FAILED" => ErrorCode::AuthenticationFailed,
            "INVALID_API_KEY" => ErrorCode::InvalidApiKey,
            "API_KEY_REVOKED" => ErrorCode::ApiKeyRevoked,
            "INVALID_PHONE_NUMBER" => ErrorCode::InvalidPhoneNumber,
            "PHONE_NUMBER_BLOCKED" => ErrorCode::PhoneNumberBlocked,
            "OTP_EXPIRED" => ErrorCode::OtpExpired,
            "MAX_ATTEMPTS_EXCEEDED" => ErrorCode::MaxAttemptsExceeded,
            "INVALID_OTP" => ErrorCode::InvalidOtp,
            "REQUEST_NOT_FOUND" => ErrorCode::RequestNotFound,
            "ALREADY_VERIFIED" => ErrorCode::AlreadyVerified,
            "RATE_LIMIT_EXCEEDED" => ErrorCode::RateLimitExceeded,
            "INSUFFICIENT_BALANCE" => ErrorCode::InsufficientBalance,
            "PAYMENT_REQUIRED" => ErrorCode::PaymentRequired,
            "BRAND_NOT_CONFIGURED" => ErrorCode::BrandNotConfigured,
            "BRAND_NOT_AUTHORIZED" => ErrorCode::BrandNotAuthorized,
            "BRAND_PENDING_APPROVAL" => ErrorCode::BrandPendingApproval,
            "BRAND_CREATION_FAILED" => ErrorCode::BrandCreationFailed,
            "SMS_SEND_FAILED" => ErrorCode::SmsSendFailed,
            "PROVIDER_UNAVAILABLE" => ErrorCode::ProviderUnavailable,
            "VALIDATION_ERROR" => ErrorCode::ValidationError,
            "MISSING_FIELD" => ErrorCode::MissingField,
            "INTERNAL_SERVER_ERROR" => ErrorCode::InternalServerError,
            "SERVICE_UNAVAILABLE" => ErrorCode::ServiceUnavailable,
            "IDEMPOTENCY_CONFLICT" => ErrorCode::IdempotencyConflict,
            _ => ErrorCode::Unknown,
        }
    }

    /// The wire code string for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AuthenticationFailed => "AUTHENTICATION_FAILED",
            ErrorCode::InvalidApiKey => "INVALID_API_KEY",
            ErrorCode::ApiKeyRevoked => "API_KEY_REVOKED",
            ErrorCode::InvalidPhoneNumber => "INVALID_PHONE_NUMBER",
            ErrorCode::PhoneNumberBlocked => "PHONE_NUMBER_BLOCKED",
            ErrorCode::OtpExpired => "OTP_EXPIRED",
            ErrorCode::MaxAttemptsExceeded => "MAX_ATTEMPTS_EXCEEDED",
            ErrorCode::InvalidOtp => "INVALID_OTP",
            ErrorCode::RequestNotFound => "REQUEST_NOT_FOUND",
            ErrorCode::AlreadyVerified => "ALREADY_VERIFIED",
            ErrorCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorCode::InsufficientBalance => "INSUFFICIENT_BALANCE",
            ErrorCode::PaymentRequired => "PAYMENT_REQUIRED",
            ErrorCode::BrandNotConfigured => "BRAND_NOT_CONFIGURED",
            ErrorCode::BrandNotAuthorized => "BRAND_NOT_AUTHORIZED",
            ErrorCode::BrandPendingApproval => "BRAND_PENDING_APPROVAL",
            ErrorCode::BrandCreationFailed => "BRAND_CREATION_FAILED",
            ErrorCode::SmsSendFailed => "SMS_SEND_FAILED",
            ErrorCode::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::MissingField => "MISSING_FIELD",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCode::IdempotencyConflict => "IDEMPOTENCY_CONFLICT",
            ErrorCode::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Whether requests failing with this code may be retried.
    ///
    /// This is a pure function of the code: only transient server-side
    /// conditions are retryable. The wire payload may override the
    /// default for a specific response, see [`ApiError::from_wire`].
    pub fn default_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::RateLimitExceeded
                | ErrorCode::ProviderUnavailable
                | ErrorCode::ServiceUnavailable
        )
    }

    /// The HTTP status the service normally pairs with this code.
    pub fn default_http_status(&self) -> u16 {
        match self {
            ErrorCode::AuthenticationFailed
            | ErrorCode::InvalidApiKey
            | ErrorCode::ApiKeyRevoked => 401,
            ErrorCode::InvalidPhoneNumber
            | ErrorCode::OtpExpired
            | ErrorCode::MaxAttemptsExceeded
            | ErrorCode::InvalidOtp
            | ErrorCode::ValidationError
            | ErrorCode::MissingField => 400,
            ErrorCode::PhoneNumberBlocked
            | ErrorCode::BrandNotAuthorized
            | ErrorCode::BrandPendingApproval => 403,
            ErrorCode::RequestNotFound => 404,
            ErrorCode::AlreadyVerified | ErrorCode::IdempotencyConflict => 409,
            ErrorCode::RateLimitExceeded => 429,
            ErrorCode::InsufficientBalance | ErrorCode::PaymentRequired => 402,
            ErrorCode::BrandNotConfigured => 412,
            ErrorCode::SmsSendFailed => 502,
            ErrorCode::ProviderUnavailable | ErrorCode::ServiceUnavailable => 503,
            ErrorCode::BrandCreationFailed
            | ErrorCode::InternalServerError
            | ErrorCode::Unknown => 500,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error body of the service's error envelope, as it appears on the
/// wire.
#[derive(Debug, Clone, Deserialize)]
pub struct WireError {
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: Option<u16>,
    pub retryable: Option<bool>,
    pub details: Option<HashMap<String, serde_json::Value>>,
}

/// A structured rejection from the verification service.
#[derive(Error, Debug, Clone)]
#[error("{code} ({http_status}): {message}")]
pub struct ApiError {
    /// Machine-readable error kind.
    pub code: ErrorCode,
    /// Human-readable message from the service (or this client, for
    /// local validation failures).
    pub message: String,
    /// HTTP status the error was delivered with.
    pub http_status: u16,
    /// Whether the transport layer may retry the request.
    pub retryable: bool,
    /// Free-form context from the service, field errors and the like.
    pub details: Option<HashMap<String, serde_json::Value>>,
    /// Server-side correlation id, when the envelope carried one.
    pub request_id: Option<String>,
}

impl ApiError {
    /// Translate a wire error body into an `ApiError`.
    ///
    /// Never fails: unknown codes map to [`ErrorCode::Unknown`], and
    /// missing fields fall back to the per-code defaults.
    pub fn from_wire(error: WireError, request_id: Option<String>) -> Self {
        let code = ErrorCode::from_wire_code(&error.code);
        ApiError {
            code,
            message: if error.message.is_empty() {
                code.as_str().to_string()
            } else {
                error.message
            },
            http_status: error.status_code.unwrap_or_else(|| code.default_http_status()),
            retryable: error.retryable.unwrap_or_else(|| code.default_retryable()),
            details: error.details,
            request_id,
        }
    }

    /// An error carrying an HTTP status but no parseable body.
    pub fn from_status(status: u16) -> Self {
        ApiError {
            code: ErrorCode::Unknown,
            message: format!("Service returned HTTP {} with no structured error body", status),
            http_status: status,
            retryable: ErrorCode::Unknown.default_retryable(),
            details: None,
            request_id: None,
        }
    }

    /// A local validation failure, raised before any network call.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: message.into(),
            http_status: ErrorCode::ValidationError.default_http_status(),
            retryable: false,
            details: None,
            request_id: None,
        }
    }
}
