// ABOUTME: Analytics Aggregator (C7) — derived reads over the append log, short-TTL cached
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Composes [`crate::metadata_store`]'s raw aggregate queries with short-TTL
//! caching where §4.7 allows it.

use crate::cache::Cache;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::metadata_store::{MetadataStore, PerformanceSummary, PopularQuery, SlowQuery, SystemOverview};
use crate::models::{AnalyticsEvent, TrendPoint};
use chrono::{DateTime, Duration, Utc};
use std::time::Duration as StdDuration;
use uuid::Uuid;

/// Derived-result cache TTL; aggregates are allowed to lag by this much (§4.7).
const AGGREGATE_TTL_SECS: u64 = 30;

/// Default lookback window when the caller doesn't specify a range (§4.7).
#[must_use]
pub fn default_range() -> (DateTime<Utc>, DateTime<Utc>) {
    let end = Utc::now();
    (end - Duration::days(7), end)
}

/// History's page size must sit in `[1, 1000)`: `1000` itself is rejected
/// (§8 boundary behaviour — the literal testable case is honoured over the
/// component prose's inclusive-bracket wording; see DESIGN.md).
///
/// # Errors
///
/// Returns `INVALID_INPUT` if `limit` is `0` or `>= 1000`.
pub fn validate_history_limit(limit: i64) -> AppResult<()> {
    if limit <= 0 || limit >= 1000 {
        return Err(AppError::new(ErrorCode::InvalidInput, "history limit must be in [1, 1000)"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct AnalyticsAggregator {
    store: MetadataStore,
    cache: Cache,
}

impl AnalyticsAggregator {
    #[must_use]
    pub fn new(store: MetadataStore, cache: Cache) -> Self {
        Self { store, cache }
    }

    fn cache_key(parts: &[&str]) -> String {
        format!("analytics:{}", parts.join(":"))
    }

    /// # Errors
    ///
    /// Returns an error if the underlying query fails.
    pub async fn popular_queries(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<PopularQuery>> {
        let key = Self::cache_key(&["popular", &user_id.to_string(), &start.to_rfc3339(), &end.to_rfc3339(), &limit.to_string()]);
        if let Some(cached) = self.cache.get::<Vec<PopularQuery>>(&key).await {
            return Ok(cached);
        }
        let result = self.store.popular_queries(user_id, start, end, limit).await?;
        self.cache.set(&key, &result, Some(StdDuration::from_secs(AGGREGATE_TTL_SECS))).await;
        Ok(result)
    }

    /// # Errors
    ///
    /// Returns an error if the underlying query fails.
    pub async fn performance_summary(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<PerformanceSummary> {
        let key = Self::cache_key(&["perf", &user_id.to_string(), &start.to_rfc3339(), &end.to_rfc3339()]);
        if let Some(cached) = self.cache.get::<PerformanceSummary>(&key).await {
            return Ok(cached);
        }
        let result = self.store.performance_summary(user_id, start, end).await?;
        self.cache.set(&key, &result, Some(StdDuration::from_secs(AGGREGATE_TTL_SECS))).await;
        Ok(result)
    }

    /// # Errors
    ///
    /// Returns an error if the underlying query fails.
    pub async fn time_series(&self, user_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Vec<TrendPoint>> {
        let key = Self::cache_key(&["trends", &user_id.to_string(), &start.to_rfc3339(), &end.to_rfc3339()]);
        if let Some(cached) = self.cache.get::<Vec<TrendPoint>>(&key).await {
            return Ok(cached);
        }
        let result = self.store.time_series(user_id, start, end).await?;
        self.cache.set(&key, &result, Some(StdDuration::from_secs(AGGREGATE_TTL_SECS))).await;
        Ok(result)
    }

    /// Paged history; not cached since it's a live, offset-addressed view (§4.7).
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` if `limit` is out of range, else propagates
    /// the underlying query's error.
    pub async fn history(&self, user_id: Uuid, limit: i64, offset: i64) -> AppResult<Vec<AnalyticsEvent>> {
        validate_history_limit(limit)?;
        if offset < 0 {
            return Err(AppError::new(ErrorCode::InvalidInput, "offset must be >= 0"));
        }
        self.store.search_history(user_id, limit, offset).await
    }

    /// Admin-only. # Errors
    ///
    /// Returns an error if the underlying query fails.
    pub async fn system_overview(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<SystemOverview> {
        let key = Self::cache_key(&["overview", &start.to_rfc3339(), &end.to_rfc3339()]);
        if let Some(cached) = self.cache.get::<SystemOverview>(&key).await {
            return Ok(cached);
        }
        let result = self.store.system_overview(start, end).await?;
        self.cache.set(&key, &result, Some(StdDuration::from_secs(AGGREGATE_TTL_SECS))).await;
        Ok(result)
    }

    /// Admin-only. # Errors
    ///
    /// Returns an error if the underlying query fails.
    pub async fn slowest_queries(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Vec<SlowQuery>> {
        let key = Self::cache_key(&["slowest", &start.to_rfc3339(), &end.to_rfc3339()]);
        if let Some(cached) = self.cache.get::<Vec<SlowQuery>>(&key).await {
            return Ok(cached);
        }
        let result = self.store.slowest_queries(start, end).await?;
        self.cache.set(&key, &result, Some(StdDuration::from_secs(AGGREGATE_TTL_SECS))).await;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_limit_boundaries() {
        assert!(validate_history_limit(0).is_err());
        assert!(validate_history_limit(1).is_ok());
        assert!(validate_history_limit(999).is_ok());
        assert!(validate_history_limit(1000).is_err());
    }
}
