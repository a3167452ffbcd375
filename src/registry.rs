// ABOUTME: Connection Registry (C3) — lazy, bounded per-tenant MySQL pools with single-flight hydration
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Maps `connection_id -> pool` (§4.3). Hydration is the only place decryption
//! runs; the registry never leaks passwords to logs or responses.

use crate::crypto::decrypt_secret;
use crate::errors::{AppError, AppResult};
use crate::metadata_store::MetadataStore;
use crate::models::{ConnectionStatus, DbConnection};
use dashmap::DashMap;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use uuid::Uuid;

type Hydration = Arc<OnceCell<AppResult<MySqlPool>>>;

/// Lazily-hydrated pool-per-tenant registry (§4.3, §9 single-flight hydration).
pub struct ConnectionRegistry {
    pools: DashMap<Uuid, MySqlPool>,
    in_flight: DashMap<Uuid, Hydration>,
    store: MetadataStore,
    encryption_key: String,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new(store: MetadataStore, encryption_key: String) -> Self {
        Self {
            pools: DashMap::new(),
            in_flight: DashMap::new(),
            store,
            encryption_key,
        }
    }

    async fn build_pool(host: &str, port: u16, database: &str, username: &str, password: &str, ssl_enabled: bool) -> AppResult<MySqlPool> {
        let ssl_mode = if ssl_enabled { "REQUIRED" } else { "DISABLED" };
        let url = format!(
            "mysql://{username}:{password}@{host}:{port}/{database}?ssl-mode={ssl_mode}"
        );
        let pool = MySqlPoolOptions::new()
            .max_connections(crate::constants::pool::MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_millis(crate::constants::pool::ACQUIRE_TIMEOUT_MS))
            .connect(&url)
            .await?;
        Ok(pool)
    }

    /// Build a pool from an explicit config, ping it, and store it if healthy (§4.3 AddConnection).
    ///
    /// # Errors
    ///
    /// Returns a typed error with suggestions if the pool can't be built or pinged.
    pub async fn add_connection(&self, conn: &DbConnection) -> AppResult<()> {
        let password = decrypt_secret(&conn.password_encrypted, &self.encryption_key)
            .unwrap_or_else(|e| {
                tracing::warn!(connection_id = %conn.id, error = %e, "credential decryption failed");
                String::new()
            });
        let pool = Self::build_pool(
            &conn.host,
            conn.port,
            &conn.database,
            &conn.username,
            &password,
            conn.ssl_enabled,
        )
        .await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        self.pools.insert(conn.id, pool);
        Ok(())
    }

    async fn hydrate(&self, id: Uuid) -> AppResult<MySqlPool> {
        let row = self
            .store
            .get_active_db_connection(id)
            .await?
            .ok_or_else(|| AppError::new(crate::errors::ErrorCode::ConnectionNotFound, "connection not found or inactive"))?;

        let password = decrypt_secret(&row.password_encrypted, &self.encryption_key)
            .unwrap_or_else(|e| {
                tracing::warn!(connection_id = %id, error = %e, "credential decryption failed");
                String::new()
            });

        Self::build_pool(&row.host, row.port, &row.database, &row.username, &password, row.ssl_enabled)
            .await
            .map_err(|e| {
                tracing::warn!(connection_id = %id, error = %e, "pool hydration failed");
                AppError::new(crate::errors::ErrorCode::ConnectionNotFound, "connection not found or inactive")
            })
    }

    /// Fetch (hydrating if necessary) the pool for a connection id, coalescing
    /// concurrent hydration attempts for the same id (§9 single-flight).
    ///
    /// # Errors
    ///
    /// Returns `CONNECTION_NOT_FOUND` if the row doesn't exist, isn't active,
    /// or the pool can't be established.
    pub async fn get_connection(&self, id: Uuid) -> AppResult<MySqlPool> {
        if let Some(pool) = self.pools.get(&id) {
            return Ok(pool.clone());
        }

        let cell = self
            .in_flight
            .entry(id)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let result = cell
            .get_or_init(|| async { self.hydrate(id).await })
            .await
            .clone();

        self.in_flight.remove(&id);

        let pool = result?;
        self.pools.insert(id, pool.clone());
        Ok(pool)
    }

    /// Ends the pool and removes it from the registry. Idempotent (§4.3 RemoveConnection).
    pub fn remove_connection(&self, id: Uuid) {
        self.pools.remove(&id);
        self.in_flight.remove(&id);
    }

    /// Acquire+ping; updates `connection_status`/`last_tested` in the metadata
    /// store regardless of outcome (§4.3 TestConnection).
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata-store status update fails; a failed
    /// ping is reported as `Ok(false)`, not an error.
    pub async fn test_connection(&self, id: Uuid) -> AppResult<bool> {
        let healthy = match self.get_connection(id).await {
            Ok(pool) => sqlx::query("SELECT 1").execute(&pool).await.is_ok(),
            Err(_) => false,
        };
        let status = if healthy {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Failed
        };
        self.store.update_connection_status(id, status).await?;
        if !healthy {
            self.remove_connection(id);
        }
        Ok(healthy)
    }

    /// Tests every currently-hydrated pool (§4.3 GetConnectionStatuses).
    pub async fn connection_statuses(&self) -> HashMap<Uuid, bool> {
        let ids: Vec<Uuid> = self.pools.iter().map(|entry| *entry.key()).collect();
        let mut statuses = HashMap::with_capacity(ids.len());
        for id in ids {
            let healthy = self.test_connection(id).await.unwrap_or(false);
            statuses.insert(id, healthy);
        }
        statuses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_is_idempotent_on_empty_registry() {
        // Constructing a real MetadataStore requires a live pool; this test
        // only exercises the synchronous, store-independent path.
        let pools: DashMap<Uuid, MySqlPool> = DashMap::new();
        let id = Uuid::new_v4();
        pools.remove(&id);
        pools.remove(&id);
        assert!(pools.is_empty());
    }
}
