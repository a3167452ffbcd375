// ABOUTME: API key and user password hashing helpers
// ABOUTME: SHA-256 hex for API keys, bcrypt for user account passwords
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use crate::errors::{AppError, AppResult};
use sha2::{Digest, Sha256};

/// Hash a full API key (e.g. `altus4_sk_live_...`) to its stored `SHA-256` hex digest.
///
/// Only the hash is ever persisted; the full key is shown to the caller once,
/// at creation time.
#[must_use]
pub fn hash_api_key(full_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(full_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hash a user-supplied password with `bcrypt`.
///
/// # Errors
///
/// Returns an error if `bcrypt` fails (e.g. the password exceeds its internal
/// length limit).
pub fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    bcrypt::hash(password, cost).map_err(|e| AppError::internal(format!("password hash failed: {e}")))
}

/// Verify a password against a stored `bcrypt` hash.
///
/// # Errors
///
/// Returns an error if the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    bcrypt::verify(password, hash)
        .map_err(|e| AppError::internal(format!("password verify failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_hash_is_deterministic() {
        let a = hash_api_key("altus4_sk_test_abc123");
        let b = hash_api_key("altus4_sk_test_abc123");
        assert_eq!(a, b);
        assert_ne!(a, hash_api_key("altus4_sk_test_abc124"));
    }

    #[test]
    fn password_round_trips() {
        let hash = hash_password("correct horse battery staple", 4).expect("hash");
        assert!(verify_password("correct horse battery staple", &hash).expect("verify"));
        assert!(!verify_password("wrong password", &hash).expect("verify"));
    }
}
