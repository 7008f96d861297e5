//! Idempotency key generation.

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

const TOKEN_LENGTH: usize = 12;

/// Generate a fresh idempotency key: `{epoch_millis}-{random_token}`.
///
/// Uniqueness rests on the pair: two keys minted in the same
/// millisecond still differ in the random token.
pub fn generate_idempotency_key() -> String {
    let millis = Utc::now().timestamp_millis();
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect();
    format!("{}-{}", millis, token)
}
