// ABOUTME: API key table queries — creation, prefix/hash lookup, usage tracking, revocation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use super::MetadataStore;
use crate::errors::AppResult;
use crate::models::{ApiKey, ApiKeyEnvironment, ApiKeyTier, Permission};
use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

fn row_to_api_key(row: &sqlx::mysql::MySqlRow) -> sqlx::Result<ApiKey> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let environment: String = row.try_get("environment")?;
    let tier: String = row.try_get("rate_limit_tier")?;
    let permissions: String = row.try_get("permissions")?;
    Ok(ApiKey {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        user_id: Uuid::parse_str(&user_id).unwrap_or_default(),
        key_prefix: row.try_get("key_prefix")?,
        key_hash: row.try_get("key_hash")?,
        name: row.try_get("name")?,
        environment: ApiKeyEnvironment::from_str_or_default(&environment),
        permissions: permissions
            .split(',')
            .filter(|s| !s.is_empty())
            .filter_map(Permission::parse)
            .collect(),
        rate_limit_tier: ApiKeyTier::from_str_or_default(&tier),
        expires_at: row.try_get("expires_at")?,
        is_active: row.try_get("is_active")?,
        usage_count: row.try_get("usage_count")?,
        last_used: row.try_get("last_used")?,
        created_at: row.try_get("created_at")?,
    })
}

fn permissions_csv(permissions: &[Permission]) -> String {
    permissions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl MetadataStore {
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_api_key(&self, key: &ApiKey) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO api_keys
             (id, user_id, key_prefix, key_hash, name, environment, permissions,
              rate_limit_tier, expires_at, is_active, usage_count, last_used, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(key.id.to_string())
        .bind(key.user_id.to_string())
        .bind(&key.key_prefix)
        .bind(&key.key_hash)
        .bind(&key.name)
        .bind(key.environment.to_string())
        .bind(permissions_csv(&key.permissions))
        .bind(key.rate_limit_tier.to_string())
        .bind(key.expires_at)
        .bind(key.is_active)
        .bind(key.usage_count)
        .bind(key.last_used)
        .bind(key.created_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Lookup by the `(key_prefix, key_hash)` pair that uniquely resolves a key (§3).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_api_key(&self, key_prefix: &str, key_hash: &str) -> AppResult<Option<ApiKey>> {
        let row = sqlx::query("SELECT * FROM api_keys WHERE key_prefix = ? AND key_hash = ?")
            .bind(key_prefix)
            .bind(key_hash)
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(row_to_api_key).transpose().map_err(Into::into)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_api_key(&self, id: Uuid) -> AppResult<Option<ApiKey>> {
        let row = sqlx::query("SELECT * FROM api_keys WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(row_to_api_key).transpose().map_err(Into::into)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_api_keys_for_user(&self, user_id: Uuid) -> AppResult<Vec<ApiKey>> {
        let rows = sqlx::query("SELECT * FROM api_keys WHERE user_id = ? ORDER BY created_at DESC")
            .bind(user_id.to_string())
            .fetch_all(self.pool())
            .await?;
        rows.iter().map(row_to_api_key).collect::<sqlx::Result<_>>().map_err(Into::into)
    }

    /// Atomic `usage_count += 1, last_used = now` on successful verification (§4.9).
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn record_api_key_usage(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE api_keys SET usage_count = usage_count + 1, last_used = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id.to_string())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Revocation marks the key inactive but retains the row for audit (§3).
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn revoke_api_key(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE api_keys SET is_active = FALSE WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_api_key(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM api_keys WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
