// ABOUTME: Metadata Store (C2) — MySQL-backed persistence for users, API keys, connections, analytics
// ABOUTME: Migration bookkeeping lives in crate::migrations; this module is pure CRUD + aggregates
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Persistent, transactional store behind the system's own MySQL-compatible
//! engine (§4.2). Submodules group queries by table; [`MetadataStore`] is the
//! single handle threaded through the rest of the application.

pub mod analytics;
pub mod api_keys;
pub mod db_connections;
pub mod users;

pub use analytics::{PerformanceSummary, PopularQuery, SlowQuery, SystemOverview};

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;

/// Shared handle to the system's own bookkeeping database.
#[derive(Clone)]
pub struct MetadataStore {
    pool: MySqlPool,
}

impl MetadataStore {
    /// Connect with the pool parameters mandated by §4.3 (reused here since
    /// the metadata store is itself a MySQL-compatible target).
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be established.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(crate::constants::pool::MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_millis(crate::constants::pool::ACQUIRE_TIMEOUT_MS))
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub const fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Liveness check used by health endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    pub async fn health_check(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
