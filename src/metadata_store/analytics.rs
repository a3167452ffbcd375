// ABOUTME: search_analytics table — append log plus the raw aggregate queries backing C7
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use super::MetadataStore;
use crate::errors::AppResult;
use crate::models::AnalyticsEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use uuid::Uuid;

/// One row of the popular-queries aggregate (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularQuery {
    pub query: String,
    pub frequency: i64,
    pub avg_time: f64,
    pub avg_results: f64,
    pub last_used: DateTime<Utc>,
}

/// Single-row performance summary (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub avg_response_time: f64,
    pub max_response_time: f64,
    pub min_response_time: f64,
    pub total_queries: i64,
    pub avg_results: f64,
}

/// System-wide overview for admins (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemOverview {
    pub active_users: i64,
    pub total_queries: i64,
    pub avg_response_time: f64,
    pub avg_results: f64,
}

/// One row of the admin slowest-queries report (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlowQuery {
    pub query_text: String,
    pub execution_time_ms: i64,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
}

impl MetadataStore {
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn append_analytics_event(&self, event: &AnalyticsEvent) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO search_analytics
             (id, user_id, query_text, search_mode, database_id, result_count,
              execution_time_ms, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(event.id.to_string())
        .bind(event.user_id.to_string())
        .bind(&event.query_text)
        .bind(&event.search_mode)
        .bind(event.database_id.map(|id| id.to_string()))
        .bind(i64::try_from(event.result_count).unwrap_or(i64::MAX))
        .bind(i64::try_from(event.execution_time_ms).unwrap_or(i64::MAX))
        .bind(event.created_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn popular_queries(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<PopularQuery>> {
        let rows = sqlx::query(
            "SELECT query_text,
                    COUNT(*) AS frequency,
                    AVG(execution_time_ms) AS avg_time,
                    AVG(result_count) AS avg_results,
                    MAX(created_at) AS last_used
             FROM search_analytics
             WHERE user_id = ? AND created_at BETWEEN ? AND ?
             GROUP BY query_text
             ORDER BY frequency DESC
             LIMIT ?",
        )
        .bind(user_id.to_string())
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(PopularQuery {
                    query: row.try_get("query_text")?,
                    frequency: row.try_get("frequency")?,
                    avg_time: row.try_get("avg_time")?,
                    avg_results: row.try_get("avg_results")?,
                    last_used: row.try_get("last_used")?,
                })
            })
            .collect::<sqlx::Result<_>>()
            .map_err(Into::into)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn performance_summary(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<PerformanceSummary> {
        let row = sqlx::query(
            "SELECT
                COALESCE(AVG(execution_time_ms), 0) AS avg_response_time,
                COALESCE(MAX(execution_time_ms), 0) AS max_response_time,
                COALESCE(MIN(execution_time_ms), 0) AS min_response_time,
                COUNT(*) AS total_queries,
                COALESCE(AVG(result_count), 0) AS avg_results
             FROM search_analytics
             WHERE user_id = ? AND created_at BETWEEN ? AND ?",
        )
        .bind(user_id.to_string())
        .bind(start)
        .bind(end)
        .fetch_one(self.pool())
        .await?;

        Ok(PerformanceSummary {
            avg_response_time: row.try_get("avg_response_time")?,
            max_response_time: row.try_get("max_response_time")?,
            min_response_time: row.try_get("min_response_time")?,
            total_queries: row.try_get("total_queries")?,
            avg_results: row.try_get("avg_results")?,
        })
    }

    /// Group by `DATE(created_at)` (§4.7).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn time_series(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<crate::models::TrendPoint>> {
        let rows = sqlx::query(
            "SELECT DATE(created_at) AS day,
                    COUNT(*) AS query_count,
                    AVG(execution_time_ms) AS avg_response_time
             FROM search_analytics
             WHERE user_id = ? AND created_at BETWEEN ? AND ?
             GROUP BY day
             ORDER BY day ASC",
        )
        .bind(user_id.to_string())
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;

        rows.iter()
            .map(|row| {
                let day: chrono::NaiveDate = row.try_get("day")?;
                Ok(crate::models::TrendPoint {
                    date: day.to_string(),
                    query_count: row.try_get("query_count")?,
                    avg_response_time: row.try_get("avg_response_time")?,
                })
            })
            .collect::<sqlx::Result<_>>()
            .map_err(Into::into)
    }

    /// Paged history, ordered by `created_at DESC` (§4.7).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn search_history(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<AnalyticsEvent>> {
        let rows = sqlx::query(
            "SELECT * FROM search_analytics WHERE user_id = ?
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id.to_string())
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?;

        rows.iter()
            .map(|row| {
                let id: String = row.try_get("id")?;
                let user_id: String = row.try_get("user_id")?;
                let database_id: Option<String> = row.try_get("database_id")?;
                Ok(AnalyticsEvent {
                    id: Uuid::parse_str(&id).unwrap_or_default(),
                    user_id: Uuid::parse_str(&user_id).unwrap_or_default(),
                    query_text: row.try_get("query_text")?,
                    search_mode: row.try_get("search_mode")?,
                    database_id: database_id.and_then(|s| Uuid::parse_str(&s).ok()),
                    result_count: u64::try_from(row.try_get::<i64, _>("result_count")?).unwrap_or(0),
                    execution_time_ms: u64::try_from(row.try_get::<i64, _>("execution_time_ms")?)
                        .unwrap_or(0),
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect::<sqlx::Result<_>>()
            .map_err(Into::into)
    }

    /// System-wide, admin-only (§4.7).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn system_overview(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<SystemOverview> {
        let row = sqlx::query(
            "SELECT
                COUNT(DISTINCT user_id) AS active_users,
                COUNT(*) AS total_queries,
                COALESCE(AVG(execution_time_ms), 0) AS avg_response_time,
                COALESCE(AVG(result_count), 0) AS avg_results
             FROM search_analytics
             WHERE created_at BETWEEN ? AND ?",
        )
        .bind(start)
        .bind(end)
        .fetch_one(self.pool())
        .await?;

        Ok(SystemOverview {
            active_users: row.try_get("active_users")?,
            total_queries: row.try_get("total_queries")?,
            avg_response_time: row.try_get("avg_response_time")?,
            avg_results: row.try_get("avg_results")?,
        })
    }

    /// Top 10 by `execution_time_ms` desc, joined with user identity (§4.7).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn slowest_queries(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<SlowQuery>> {
        let rows = sqlx::query(
            "SELECT sa.query_text, sa.execution_time_ms, u.email AS user_email, sa.created_at
             FROM search_analytics sa
             JOIN users u ON u.id = sa.user_id
             WHERE sa.created_at BETWEEN ? AND ?
             ORDER BY sa.execution_time_ms DESC
             LIMIT 10",
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(SlowQuery {
                    query_text: row.try_get("query_text")?,
                    execution_time_ms: row.try_get("execution_time_ms")?,
                    user_email: row.try_get("user_email")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect::<sqlx::Result<_>>()
            .map_err(Into::into)
    }
}
