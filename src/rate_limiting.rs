// ABOUTME: Rate Limiter (C8) — per-API-key sliding window backed by the Cache Layer
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Per-key sliding-window rate limiting (§4.8).

use crate::cache::{rate_limit_key, Cache};
use crate::models::ApiKeyTier;
use std::time::Duration;
use uuid::Uuid;

/// Outcome of a rate-limit check, surfaced to callers as response metadata.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub tier: ApiKeyTier,
    pub limit: u32,
    pub remaining: u32,
}

/// Increments the per-key counter and decides whether the request is allowed.
///
/// On the first request in a window the counter is given a TTL equal to the
/// window width; every increment inside that window shares the same expiry,
/// producing a fixed window that resets `WINDOW_SECS` after its first hit.
pub async fn check_and_increment(
    cache: &Cache,
    api_key_id: Uuid,
    tier: ApiKeyTier,
) -> RateLimitDecision {
    let key = rate_limit_key(&api_key_id.to_string());
    let limit = tier.requests_per_minute();

    let count = cache.incr(&key).await;
    if count == 1 {
        cache
            .expire(&key, Duration::from_secs(crate::constants::rate_limit::WINDOW_SECS))
            .await;
    }

    let count = u32::try_from(count.max(0)).unwrap_or(u32::MAX);
    let remaining = limit.saturating_sub(count);

    RateLimitDecision {
        allowed: count <= limit,
        tier,
        limit,
        remaining,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;

    #[tokio::test]
    async fn allows_within_budget_and_denies_over() {
        let cache = Cache::new(CacheConfig::default()).await.expect("cache");
        let key_id = Uuid::new_v4();

        for _ in 0..crate::constants::rate_limit::FREE_PER_MIN {
            let decision = check_and_increment(&cache, key_id, ApiKeyTier::Free).await;
            assert!(decision.allowed);
        }
        let over = check_and_increment(&cache, key_id, ApiKeyTier::Free).await;
        assert!(!over.allowed);
        assert_eq!(over.remaining, 0);
    }

    #[tokio::test]
    async fn tiers_carry_distinct_budgets() {
        let cache = Cache::new(CacheConfig::default()).await.expect("cache");
        let free_decision = check_and_increment(&cache, Uuid::new_v4(), ApiKeyTier::Free).await;
        let pro_decision = check_and_increment(&cache, Uuid::new_v4(), ApiKeyTier::Pro).await;
        let ent_decision =
            check_and_increment(&cache, Uuid::new_v4(), ApiKeyTier::Enterprise).await;
        assert_eq!(free_decision.limit, crate::constants::rate_limit::FREE_PER_MIN);
        assert_eq!(pro_decision.limit, crate::constants::rate_limit::PRO_PER_MIN);
        assert_eq!(
            ent_decision.limit,
            crate::constants::rate_limit::ENTERPRISE_PER_MIN
        );
    }
}
