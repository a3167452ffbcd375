// ABOUTME: In-memory cache backend with LRU eviction and TTL support
// ABOUTME: Sorted sets are kept in an unbounded side map since recency lists stay small
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use super::{CacheBackend, CacheConfig};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Entry {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|t| Instant::now() >= t)
    }
}

/// In-memory cache used when no `CACHE_URL`/Redis is configured.
#[derive(Clone)]
pub struct InMemoryCache {
    store: Arc<RwLock<lru::LruCache<String, Entry>>>,
    zsets: Arc<RwLock<HashMap<String, Vec<(f64, String)>>>>,
}

impl InMemoryCache {
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
        Some(n) => n,
        None => unreachable!(),
    };

    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(Self::DEFAULT_CAPACITY);
        Self {
            store: Arc::new(RwLock::new(lru::LruCache::new(capacity))),
            zsets: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait::async_trait]
impl CacheBackend for InMemoryCache {
    async fn get_raw(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let mut store = self.store.write().await;
        if let Some(entry) = store.get(key) {
            if entry.is_expired() {
                store.pop(key);
                return Ok(None);
            }
            return Ok(Some(entry.data.clone()));
        }
        Ok(None)
    }

    async fn set_raw(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> anyhow::Result<()> {
        let entry = Entry {
            data: value,
            expires_at: ttl.map(|d| Instant::now() + d),
        };
        self.store.write().await.push(key.to_owned(), entry);
        Ok(())
    }

    async fn del(&self, key: &str) -> anyhow::Result<()> {
        self.store.write().await.pop(key);
        self.zsets.write().await.remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str) -> anyhow::Result<i64> {
        let mut store = self.store.write().await;
        let current = store
            .get(key)
            .filter(|e| !e.is_expired())
            .and_then(|e| std::str::from_utf8(&e.data).ok()?.parse::<i64>().ok())
            .unwrap_or(0);
        let next = current + 1;
        let expires_at = store.get(key).and_then(|e| e.expires_at);
        store.push(
            key.to_owned(),
            Entry {
                data: next.to_string().into_bytes(),
                expires_at,
            },
        );
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> anyhow::Result<()> {
        let mut store = self.store.write().await;
        if let Some(entry) = store.get(key) {
            let data = entry.data.clone();
            store.push(
                key.to_owned(),
                Entry {
                    data,
                    expires_at: Some(Instant::now() + ttl),
                },
            );
        }
        Ok(())
    }

    async fn zadd(&self, key: &str, score: f64, member: &str) -> anyhow::Result<()> {
        let mut zsets = self.zsets.write().await;
        let set = zsets.entry(key.to_owned()).or_default();
        set.retain(|(_, m)| m != member);
        set.push((score, member.to_owned()));
        Ok(())
    }

    async fn zrevrange(&self, key: &str, start: isize, stop: isize) -> anyhow::Result<Vec<String>> {
        let zsets = self.zsets.read().await;
        let Some(set) = zsets.get(key) else {
            return Ok(Vec::new());
        };
        let mut sorted = set.clone();
        sorted.sort_by(|a, b| b.0.total_cmp(&a.0));
        let len = sorted.len() as isize;
        let normalize = |i: isize| -> isize {
            if i < 0 {
                (len + i).max(0)
            } else {
                i
            }
        };
        let start = normalize(start).min(len);
        let stop = normalize(stop).min(len - 1);
        if start > stop || len == 0 {
            return Ok(Vec::new());
        }
        #[allow(clippy::cast_sign_loss)]
        Ok(sorted[start as usize..=stop as usize]
            .iter()
            .map(|(_, m)| m.clone())
            .collect())
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn clear_all(&self) -> anyhow::Result<()> {
        self.store.write().await.clear();
        self.zsets.write().await.clear();
        Ok(())
    }
}
