// ABOUTME: Redis cache backend with connection pooling for distributed deployments
// ABOUTME: Backs the typed KV/counter/sorted-set surface CacheBackend defines
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use super::CacheBackend;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{error, info};

/// Redis-backed cache using a `ConnectionManager` for pooling and auto-reconnect.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    /// Connect to the configured Redis instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be constructed or the initial
    /// connection fails.
    pub async fn connect(redis_url: &str) -> anyhow::Result<Self> {
        info!("connecting to cache backend at {}", redacted_url(redis_url));
        let client = redis::Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self { manager })
    }
}

fn redacted_url(url: &str) -> String {
    url::Url::parse(url).map_or_else(
        |_| "<unparseable>".to_owned(),
        |mut u| {
            let _ = u.set_password(None);
            u.to_string()
        },
    )
}

#[async_trait::async_trait]
impl CacheBackend for RedisCache {
    async fn get_raw(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let mut conn = self.manager.clone();
        let data: Option<Vec<u8>> = conn.get(key).await.map_err(|e| {
            error!(error = %e, "cache GET failed");
            anyhow::anyhow!("cache GET failed: {e}")
        })?;
        Ok(data)
    }

    async fn set_raw(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> anyhow::Result<()> {
        let mut conn = self.manager.clone();
        if let Some(ttl) = ttl {
            conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()).await?;
        } else {
            conn.set::<_, _, ()>(key, value).await?;
        }
        Ok(())
    }

    async fn del(&self, key: &str) -> anyhow::Result<()> {
        let mut conn = self.manager.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn incr(&self, key: &str) -> anyhow::Result<i64> {
        let mut conn = self.manager.clone();
        let value: i64 = conn.incr(key, 1).await?;
        Ok(value)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> anyhow::Result<()> {
        let mut conn = self.manager.clone();
        let _: () = conn.expire(key, ttl.as_secs() as i64).await?;
        Ok(())
    }

    async fn zadd(&self, key: &str, score: f64, member: &str) -> anyhow::Result<()> {
        let mut conn = self.manager.clone();
        let _: () = conn.zadd(key, member, score).await?;
        Ok(())
    }

    async fn zrevrange(&self, key: &str, start: isize, stop: isize) -> anyhow::Result<Vec<String>> {
        let mut conn = self.manager.clone();
        let members: Vec<String> = conn.zrevrange(key, start, stop).await?;
        Ok(members)
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        let mut conn = self.manager.clone();
        let response: String = redis::cmd("PING").query_async(&mut conn).await?;
        if response == "PONG" {
            Ok(())
        } else {
            Err(anyhow::anyhow!("unexpected PING response '{response}'"))
        }
    }

    async fn clear_all(&self) -> anyhow::Result<()> {
        let mut conn = self.manager.clone();
        let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
        Ok(())
    }
}
