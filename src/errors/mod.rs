//! Error types for the Veriway client.
//!
//! Every failure a caller can observe falls into one of two categories:
//! - [`Error::Api`]: the service answered with a structured error
//!   envelope, translated into an [`ApiError`] with a closed
//!   [`ErrorCode`] so callers can `match` on the kind.
//! - [`Error::Connection`]: the service could not be reached at all
//!   (DNS failure, connection reset, TLS error, timeout). These carry
//!   no error code and are never reclassified as domain errors.

mod api_error;

pub use api_error::{ApiError, ErrorCode, WireError};

use thiserror::Error;

/// Top-level error type returned by every client operation.
#[derive(Error, Debug)]
pub enum Error {
    /// The service rejected the request with a structured error.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The service could not be reached; no structured payload exists.
    #[error("Connection failure: {0}")]
    Connection(String),
}

impl Error {
    /// True when the retry state machine may re-attempt the request.
    ///
    /// Connection faults are deliberately not retryable here: they sit
    /// outside the error taxonomy and are left to the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Api(api) => api.retryable,
            Error::Connection(_) => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Connection(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
