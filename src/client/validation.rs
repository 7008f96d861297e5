//! Local input checks, applied before any network call.
//!
//! A request that fails here never touches the transport, so it spends
//! no retry budget and produces a `VALIDATION_ERROR` synchronously.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{ApiError, Error, Result};

/// E.164: '+', a 1-9 first digit, then 1 to 14 more digits.
static E164_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").unwrap());

/// Shortest and longest code the service will issue.
pub const MIN_CODE_LENGTH: usize = 4;
pub const MAX_CODE_LENGTH: usize = 8;

/// Check E.164 format without normalizing; the service accepts only
/// the strict form.
pub fn is_valid_phone_number(phone: &str) -> bool {
    E164_REGEX.is_match(phone)
}

pub fn validate_phone_number(phone: &str) -> Result<()> {
    if is_valid_phone_number(phone) {
        Ok(())
    } else {
        Err(Error::Api(ApiError::validation(format!(
            "Invalid phone number '{}': must be E.164 format, e.g. +14155552671",
            mask_phone(phone)
        ))))
    }
}

pub fn validate_code(code: &str) -> Result<()> {
    let len = code.chars().count();
    if (MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&len) {
        Ok(())
    } else {
        Err(Error::Api(ApiError::validation(format!(
            "Code must be {} to {} characters, got {}",
            MIN_CODE_LENGTH, MAX_CODE_LENGTH, len
        ))))
    }
}

pub fn validate_request_id(request_id: &str) -> Result<()> {
    if request_id.trim().is_empty() {
        Err(Error::Api(ApiError::validation("Request id must not be empty")))
    } else {
        Ok(())
    }
}

/// Mask a phone number for logs: only the last four characters stay
/// visible.
///
/// Counts characters, not bytes: this also gets fed raw caller input
/// that failed validation, which may contain multi-byte characters.
pub fn mask_phone(phone: &str) -> String {
    let char_count = phone.chars().count();
    if char_count <= 4 {
        return "*".repeat(char_count);
    }
    let tail: String = phone.chars().skip(char_count - 4).collect();
    format!("***{}", tail)
}
