// ABOUTME: Database-connection table queries — tenant target metadata, never the decrypted password
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use super::MetadataStore;
use crate::errors::AppResult;
use crate::models::{ConnectionStatus, DbConnection};
use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

fn row_to_connection(row: &sqlx::mysql::MySqlRow) -> sqlx::Result<DbConnection> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let status: String = row.try_get("connection_status")?;
    Ok(DbConnection {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        user_id: Uuid::parse_str(&user_id).unwrap_or_default(),
        name: row.try_get("name")?,
        host: row.try_get("host")?,
        port: row.try_get::<i32, _>("port")?.try_into().unwrap_or(3306),
        database: row.try_get("database_name")?,
        username: row.try_get("username")?,
        password_encrypted: row.try_get("password_encrypted")?,
        ssl_enabled: row.try_get("ssl_enabled")?,
        is_active: row.try_get("is_active")?,
        connection_status: ConnectionStatus::from_str_or_default(&status),
        last_tested: row.try_get("last_tested")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl MetadataStore {
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_db_connection(&self, conn: &DbConnection) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO database_connections
             (id, user_id, name, host, port, database_name, username, password_encrypted,
              ssl_enabled, is_active, connection_status, last_tested, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(conn.id.to_string())
        .bind(conn.user_id.to_string())
        .bind(&conn.name)
        .bind(&conn.host)
        .bind(i32::from(conn.port))
        .bind(&conn.database)
        .bind(&conn.username)
        .bind(&conn.password_encrypted)
        .bind(conn.ssl_enabled)
        .bind(conn.is_active)
        .bind(conn.connection_status.to_string())
        .bind(conn.last_tested)
        .bind(conn.created_at)
        .bind(conn.updated_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Only rows with `is_active = TRUE` hydrate (§4.3 GetConnection).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_active_db_connection(&self, id: Uuid) -> AppResult<Option<DbConnection>> {
        let row = sqlx::query("SELECT * FROM database_connections WHERE id = ? AND is_active = TRUE")
            .bind(id.to_string())
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(row_to_connection).transpose().map_err(Into::into)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_db_connection(&self, id: Uuid) -> AppResult<Option<DbConnection>> {
        let row = sqlx::query("SELECT * FROM database_connections WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(row_to_connection).transpose().map_err(Into::into)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_db_connections_for_user(&self, user_id: Uuid) -> AppResult<Vec<DbConnection>> {
        let rows = sqlx::query(
            "SELECT * FROM database_connections WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool())
        .await?;
        rows.iter()
            .map(row_to_connection)
            .collect::<sqlx::Result<_>>()
            .map_err(Into::into)
    }

    /// # Errors
    ///
    /// Returns an error if the update fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_db_connection(
        &self,
        id: Uuid,
        name: &str,
        host: &str,
        port: u16,
        database: &str,
        username: &str,
        password_encrypted: &str,
        ssl_enabled: bool,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE database_connections
             SET name = ?, host = ?, port = ?, database_name = ?, username = ?,
                 password_encrypted = ?, ssl_enabled = ?, updated_at = NOW()
             WHERE id = ?",
        )
        .bind(name)
        .bind(host)
        .bind(i32::from(port))
        .bind(database)
        .bind(username)
        .bind(password_encrypted)
        .bind(ssl_enabled)
        .bind(id.to_string())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Records the outcome of a `TestConnection` health ping (§4.3).
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update_connection_status(&self, id: Uuid, status: ConnectionStatus) -> AppResult<()> {
        sqlx::query(
            "UPDATE database_connections SET connection_status = ?, last_tested = ? WHERE id = ?",
        )
        .bind(status.to_string())
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Soft-removal: marks inactive, evicting the live pool is the registry's job (§3).
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn deactivate_db_connection(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE database_connections SET is_active = FALSE, updated_at = NOW() WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
