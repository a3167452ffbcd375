// ABOUTME: Tenant database connection model — the target of C3/C4/C5, owned by a User
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Unknown,
    Connected,
    Failed,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Connected => write!(f, "connected"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl ConnectionStatus {
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "connected" => Self::Connected,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// A tenant's MySQL-compatible target database. Never returned to clients with
/// password fields — see [`DbConnectionResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConnection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    /// AEAD ciphertext produced by [`crate::crypto::encrypt_secret`].
    pub password_encrypted: String,
    pub ssl_enabled: bool,
    pub is_active: bool,
    pub connection_status: ConnectionStatus,
    pub last_tested: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbConnection {
    /// Project to the client-facing shape, omitting `password_encrypted` by
    /// construction rather than by post-hoc field stripping.
    #[must_use]
    pub fn into_response(self) -> DbConnectionResponse {
        DbConnectionResponse {
            id: self.id,
            name: self.name,
            host: self.host,
            port: self.port,
            database: self.database,
            username: self.username,
            ssl_enabled: self.ssl_enabled,
            is_active: self.is_active,
            connection_status: self.connection_status,
            last_tested: self.last_tested,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Client-facing projection of [`DbConnection`]; has no `password_encrypted` field at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConnectionResponse {
    pub id: Uuid,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub ssl_enabled: bool,
    pub is_active: bool,
    pub connection_status: ConnectionStatus,
    pub last_tested: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
