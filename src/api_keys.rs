// ABOUTME: API key generation and format validation for the data-plane (§4.9, §3 APIKey)
// ABOUTME: Business logic only — persistence lives in the Metadata Store (C2)
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! API key lifecycle helpers: generation, format parsing, and permission checks.

use crate::constants::key_prefixes;
use crate::crypto::hashing::hash_api_key;
use crate::errors::{AppError, AppResult};
use crate::models::{ApiKeyEnvironment, Permission};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

const SECRET_LEN: usize = 32;

/// A freshly generated key pair: the plaintext (shown once) and its persisted fields.
#[derive(Debug, Clone)]
pub struct GeneratedApiKey {
    /// Full secret, e.g. `altus4_sk_live_AbCd1234...`. Shown to the caller exactly once.
    pub full_key: String,
    pub key_prefix: String,
    pub key_hash: String,
}

/// Generates and parses `altus4_sk_<env>_<secret>` keys.
#[derive(Clone, Default)]
pub struct ApiKeyManager;

impl ApiKeyManager {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Generate a new key for the given environment.
    #[must_use]
    pub fn generate(&self, environment: ApiKeyEnvironment) -> GeneratedApiKey {
        let secret: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SECRET_LEN)
            .map(char::from)
            .collect();

        let full_key = format!(
            "{}{}_{}",
            key_prefixes::API_KEY_PREFIX,
            environment,
            secret
        );
        let key_prefix = full_key
            .chars()
            .take(key_prefixes::PREFIX_LEN)
            .collect::<String>();
        let key_hash = hash_api_key(&full_key);

        GeneratedApiKey {
            full_key,
            key_prefix,
            key_hash,
        }
    }

    /// Hash a presented full key for lookup by `(key_prefix, key_hash)`.
    #[must_use]
    pub fn hash_key(&self, full_key: &str) -> String {
        hash_api_key(full_key)
    }

    /// Extract the lookup prefix from a presented full key.
    #[must_use]
    pub fn prefix_of(full_key: &str) -> String {
        full_key
            .chars()
            .take(key_prefixes::PREFIX_LEN)
            .collect::<String>()
    }

    /// Validate the presented key has the expected `altus4_sk_<env>_<secret>` shape.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_API_KEY_FORMAT` if the key doesn't start with the
    /// stable prefix or has no trailing secret material.
    pub fn validate_format(full_key: &str) -> AppResult<()> {
        let rest = full_key
            .strip_prefix(key_prefixes::API_KEY_PREFIX)
            .ok_or_else(|| {
                AppError::new(
                    crate::errors::ErrorCode::InvalidApiKeyFormat,
                    "API key does not start with the expected prefix",
                )
            })?;
        let mut parts = rest.splitn(2, '_');
        let env = parts.next().unwrap_or_default();
        let secret = parts.next().unwrap_or_default();
        if !matches!(env, "test" | "live") || secret.is_empty() {
            return Err(AppError::new(
                crate::errors::ErrorCode::InvalidApiKeyFormat,
                "API key must be of the form altus4_sk_<test|live>_<secret>",
            ));
        }
        Ok(())
    }
}

/// Parse a comma/array-free permission list from stored strings, dropping unknowns.
#[must_use]
pub fn parse_permissions(raw: &[String]) -> Vec<Permission> {
    raw.iter().filter_map(|s| Permission::parse(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_round_trips_through_hash() {
        let manager = ApiKeyManager::new();
        let generated = manager.generate(ApiKeyEnvironment::Test);
        assert!(generated.full_key.starts_with("altus4_sk_test_"));
        assert_eq!(generated.key_hash, manager.hash_key(&generated.full_key));
        assert_eq!(generated.key_prefix, ApiKeyManager::prefix_of(&generated.full_key));
        ApiKeyManager::validate_format(&generated.full_key).expect("valid format");
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(ApiKeyManager::validate_format("not_a_key").is_err());
        assert!(ApiKeyManager::validate_format("altus4_sk_prod_abc").is_err());
        assert!(ApiKeyManager::validate_format("altus4_sk_live_").is_err());
    }
}
