// ABOUTME: Cache abstraction layer (C6) — typed KV + counters + sorted sets
// ABOUTME: Pluggable in-memory/Redis backends; the outer facade is fail-soft on every operation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Cache Layer (C6).
//!
//! The backend trait mirrors a small Redis-shaped surface: scalar get/set/del,
//! an atomic counter, and a sorted set for recency-ranked data. [`Cache`] wraps
//! whichever backend is configured and makes every operation fail-soft: a
//! transport error degrades reads to the type's zero value and drops writes,
//! logging a warning rather than propagating to the caller.

pub mod factory;
pub mod memory;
pub mod redis;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use factory::Cache;

/// Backend-level cache trait. Unlike the outer [`Cache`] facade, implementations
/// of this trait return real errors — fail-soft behaviour is applied one layer up.
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch a raw value.
    async fn get_raw(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;
    /// Store a raw value with an optional TTL.
    async fn set_raw(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> anyhow::Result<()>;
    /// Remove a key.
    async fn del(&self, key: &str) -> anyhow::Result<()>;
    /// Atomically increment a counter, returning the new value. Creates the
    /// counter at 1 if absent.
    async fn incr(&self, key: &str) -> anyhow::Result<i64>;
    /// Give a key a TTL (used after `incr` establishes the rate-limit window).
    async fn expire(&self, key: &str, ttl: Duration) -> anyhow::Result<()>;
    /// Add a member to a sorted set with the given score.
    async fn zadd(&self, key: &str, score: f64, member: &str) -> anyhow::Result<()>;
    /// Read a score-descending range `[start, stop]` (inclusive, `-1` = last element).
    async fn zrevrange(&self, key: &str, start: isize, stop: isize) -> anyhow::Result<Vec<String>>;
    /// Verify the backend is reachable.
    async fn health_check(&self) -> anyhow::Result<()>;
    /// Remove every key (tests/admin only).
    async fn clear_all(&self) -> anyhow::Result<()>;
}

/// Cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum entries for the in-memory backend.
    pub max_entries: usize,
    /// Redis connection URL; `None` selects the in-memory backend.
    pub redis_url: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: crate::constants::cache::DEFAULT_MAX_ENTRIES,
            redis_url: None,
        }
    }
}

/// Deterministic cache key for a search request, per §4.6: normalised JSON of
/// `{query, databases.sorted(), tables.sorted(), columns.sorted(), search_mode, limit, offset}`,
/// base64-encoded, prefixed `search:`.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn search_cache_key(
    query: &str,
    databases: &[String],
    tables: &[String],
    columns: &[String],
    search_mode: &str,
    limit: u32,
    offset: u32,
) -> String {
    use base64::{engine::general_purpose, Engine as _};

    let mut databases = databases.to_vec();
    let mut tables = tables.to_vec();
    let mut columns = columns.to_vec();
    databases.sort();
    tables.sort();
    columns.sort();

    let normalized = serde_json::json!({
        "query": query,
        "databases": databases,
        "tables": tables,
        "columns": columns,
        "search_mode": search_mode,
        "limit": limit,
        "offset": offset,
    });
    let encoded = general_purpose::STANDARD.encode(normalized.to_string());
    format!("{}{}", crate::constants::cache::SEARCH_PREFIX, encoded)
}

/// `session:<user_id>` namespace key.
#[must_use]
pub fn session_key(user_id: &uuid::Uuid) -> String {
    format!("{}{}", crate::constants::cache::SESSION_PREFIX, user_id)
}

/// `query_popularity:<query>` counter key.
#[must_use]
pub fn popularity_key(query: &str) -> String {
    format!("{}{}", crate::constants::cache::POPULARITY_PREFIX, query)
}

/// `recent_queries:<user_id>` sorted-set key.
#[must_use]
pub fn recent_queries_key(user_id: &uuid::Uuid) -> String {
    format!("{}{}", crate::constants::cache::RECENT_QUERIES_PREFIX, user_id)
}

/// `rate_limit:<api_key_id>` counter key.
#[must_use]
pub fn rate_limit_key(api_key_id: &str) -> String {
    format!("{}{}", crate::constants::cache::RATE_LIMIT_PREFIX, api_key_id)
}

pub(crate) fn serialize<T: Serialize>(value: &T) -> Option<Vec<u8>> {
    match serde_json::to_vec(value) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!(error = %e, "cache: failed to serialize value, dropping write");
            None
        }
    }
}

pub(crate) fn deserialize<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Option<T> {
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, "cache: failed to deserialize value, treating as miss");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_cache_key_is_invariant_under_array_permutation() {
        let a = search_cache_key(
            "mysql",
            &["db2".to_owned(), "db1".to_owned()],
            &["t2".to_owned(), "t1".to_owned()],
            &["c2".to_owned(), "c1".to_owned()],
            "natural",
            20,
            0,
        );
        let b = search_cache_key(
            "mysql",
            &["db1".to_owned(), "db2".to_owned()],
            &["t1".to_owned(), "t2".to_owned()],
            &["c1".to_owned(), "c2".to_owned()],
            "natural",
            20,
            0,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn search_cache_key_is_prefixed_and_differs_on_query() {
        let a = search_cache_key("mysql", &[], &[], &[], "natural", 20, 0);
        let b = search_cache_key("postgres", &[], &[], &[], "natural", 20, 0);
        assert!(a.starts_with(crate::constants::cache::SEARCH_PREFIX));
        assert_ne!(a, b);
    }
}
