// ABOUTME: User table queries — registration, lookup, profile update, soft deactivation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use super::MetadataStore;
use crate::errors::AppResult;
use crate::models::{User, UserRole};
use sqlx::Row;
use uuid::Uuid;

fn row_to_user(row: &sqlx::mysql::MySqlRow) -> sqlx::Result<User> {
    let id: String = row.try_get("id")?;
    let role: String = row.try_get("role")?;
    Ok(User {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        password_hash: row.try_get("password_hash")?,
        role: UserRole::from_str_or_default(&role),
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl MetadataStore {
    /// Self-registration. Fails with a database-layer unique-constraint error
    /// (mapped by `From<sqlx::Error>`) if the email is already taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_user(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, role, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(row_to_user).transpose().map_err(Into::into)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(row_to_user).transpose().map_err(Into::into)
    }

    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update_user_profile(&self, id: Uuid, name: &str, email: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET name = ?, email = ?, updated_at = NOW() WHERE id = ?")
            .bind(name)
            .bind(email)
            .bind(id.to_string())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = ?, updated_at = NOW() WHERE id = ?")
            .bind(password_hash)
            .bind(id.to_string())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Soft-deactivation; the row is retained for audit (§3 Lifecycle/ownership).
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn deactivate_user(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
