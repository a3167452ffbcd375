// ABOUTME: Cache facade selecting in-memory vs Redis backend; every method is fail-soft
// ABOUTME: Transport errors degrade reads to zero values and drop writes, per §4.6
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use super::memory::InMemoryCache;
use super::redis::RedisCache;
use super::{deserialize, serialize, CacheBackend, CacheConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Cache facade used throughout the application. Wraps whichever backend is
/// configured and never returns an error: every failure degrades to the
/// type's zero value (reads) or a dropped write, logged at `warn`.
#[derive(Clone)]
pub enum Cache {
    Memory(InMemoryCache),
    Redis(RedisCache),
}

impl Cache {
    /// Build a cache instance, connecting to Redis if `redis_url` is set.
    ///
    /// # Errors
    ///
    /// Returns an error only if the Redis backend fails its initial connect;
    /// the in-memory backend never fails to construct.
    pub async fn new(config: CacheConfig) -> anyhow::Result<Self> {
        if let Some(url) = &config.redis_url {
            let redis = RedisCache::connect(url).await?;
            return Ok(Self::Redis(redis));
        }
        Ok(Self::Memory(InMemoryCache::new(&config)))
    }

    fn backend(&self) -> &dyn CacheBackend {
        match self {
            Self::Memory(c) => c,
            Self::Redis(c) => c,
        }
    }

    /// Fail-soft typed get: returns `None` on miss, malformed data, or transport error.
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        match self.backend().get_raw(key).await {
            Ok(Some(bytes)) => deserialize(&bytes),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, key, "cache GET failed, treating as miss");
                None
            }
        }
    }

    /// Fail-soft typed set: a failure is logged and dropped, never propagated.
    pub async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let Some(bytes) = serialize(value) else {
            return;
        };
        if let Err(e) = self.backend().set_raw(key, bytes, ttl).await {
            warn!(error = %e, key, "cache SET failed, dropping write");
        }
    }

    /// Fail-soft delete.
    pub async fn del(&self, key: &str) {
        if let Err(e) = self.backend().del(key).await {
            warn!(error = %e, key, "cache DEL failed");
        }
    }

    /// Fail-soft increment; returns 0 on transport error (never fatal to callers).
    pub async fn incr(&self, key: &str) -> i64 {
        match self.backend().incr(key).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, key, "cache INCR failed, returning 0");
                0
            }
        }
    }

    /// Fail-soft expire.
    pub async fn expire(&self, key: &str, ttl: Duration) {
        if let Err(e) = self.backend().expire(key, ttl).await {
            warn!(error = %e, key, "cache EXPIRE failed");
        }
    }

    /// Fail-soft sorted-set add.
    pub async fn zadd(&self, key: &str, score: f64, member: &str) {
        if let Err(e) = self.backend().zadd(key, score, member).await {
            warn!(error = %e, key, "cache ZADD failed");
        }
    }

    /// Fail-soft sorted-set range; returns an empty vector on transport error.
    pub async fn zrevrange(&self, key: &str, start: isize, stop: isize) -> Vec<String> {
        match self.backend().zrevrange(key, start, stop).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, key, "cache ZREVRANGE failed, returning empty");
                Vec::new()
            }
        }
    }

    /// Verify cache backend reachability (used by health endpoints, not fail-soft).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    pub async fn health_check(&self) -> anyhow::Result<()> {
        self.backend().health_check().await
    }

    /// Clear all cache entries (tests/admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the clear operation fails.
    pub async fn clear_all(&self) -> anyhow::Result<()> {
        self.backend().clear_all().await
    }
}
