//! # Veriway Rust SDK
//!
//! Server-side client for the Veriway phone verification API: request
//! one-time passcodes over SMS, WhatsApp or voice, verify them, and
//! query request status, all over HTTPS with typed errors and bounded
//! retry.
//!
//! ```no_run
//! use veriway_sdk::{SendOtpOptions, VerifyOtpOptions, VeriwayClient};
//!
//! # async fn example() -> Result<(), veriway_sdk::Error> {
//! let client = VeriwayClient::new("vw_live_...")?;
//!
//! let handle = client
//!     .send_otp("+14155552671", SendOtpOptions::default())
//!     .await?;
//!
//! let result = client
//!     .verify_otp(&handle.request_id, "123456", VerifyOtpOptions::default())
//!     .await?;
//! assert!(result.verified);
//! # Ok(())
//! # }
//! ```
//!
//! Failures come in exactly two shapes: [`Error::Api`] when the
//! service answered with a structured error (match on
//! [`ErrorCode`]), and [`Error::Connection`] when it could not be
//! reached at all. Retryable service errors on mutating calls are
//! retried with exponential backoff under a stable idempotency key
//! before surfacing.

pub mod client;
pub mod config;
pub mod errors;
pub mod transport;
pub mod types;

// Re-export the surface most callers need.
pub use client::{
    generate_idempotency_key, is_valid_phone_number, SendOtpOptions, VerifyOtpOptions,
    VeriwayClient,
};
pub use config::ClientConfig;
pub use errors::{ApiError, Error, ErrorCode, Result};
pub use types::{
    Channel, OtpRequest, OtpStatus, OtpStatusInfo, OtpStatusWithCode, SdkConfig,
    VerifyOtpResult,
};
