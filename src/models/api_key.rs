// ABOUTME: API key model — data-plane credential, `(key_prefix, key_hash)` uniquely resolves a key
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `test` keys talk to non-production tenants; `live` keys are production-scoped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyEnvironment {
    Test,
    Live,
}

impl std::fmt::Display for ApiKeyEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Test => write!(f, "test"),
            Self::Live => write!(f, "live"),
        }
    }
}

impl ApiKeyEnvironment {
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        if s.eq_ignore_ascii_case("live") {
            Self::Live
        } else {
            Self::Test
        }
    }
}

/// Per-minute budget tier, enforced by the Rate Limiter (§4.8).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyTier {
    Free,
    Pro,
    Enterprise,
}

impl std::fmt::Display for ApiKeyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Pro => write!(f, "pro"),
            Self::Enterprise => write!(f, "enterprise"),
        }
    }
}

impl ApiKeyTier {
    /// Requests-per-minute budget for this tier (§4.8 table).
    #[must_use]
    pub const fn requests_per_minute(self) -> u32 {
        match self {
            Self::Free => crate::constants::rate_limit::FREE_PER_MIN,
            Self::Pro => crate::constants::rate_limit::PRO_PER_MIN,
            Self::Enterprise => crate::constants::rate_limit::ENTERPRISE_PER_MIN,
        }
    }

    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pro" => Self::Pro,
            "enterprise" => Self::Enterprise,
            _ => Self::Free,
        }
    }
}

/// Scopes an API key may hold. Admin keys implicitly hold all permissions (§4.9).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Search,
    Analytics,
    Admin,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Search => write!(f, "search"),
            Self::Analytics => write!(f, "analytics"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl Permission {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "search" => Some(Self::Search),
            "analytics" => Some(Self::Analytics),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Data-plane credential. The plaintext secret is returned exactly once at
/// creation; only `key_hash` + `key_prefix` persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: Uuid,
    pub user_id: Uuid,
    pub key_prefix: String,
    pub key_hash: String,
    pub name: String,
    pub environment: ApiKeyEnvironment,
    pub permissions: Vec<Permission>,
    pub rate_limit_tier: ApiKeyTier,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub usage_count: i64,
    pub last_used: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ApiKey {
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&Permission::Admin) || self.permissions.contains(&permission)
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| exp <= Utc::now())
    }

    /// Strip the hash for client-facing responses.
    #[must_use]
    pub fn into_response(self) -> ApiKeyResponse {
        ApiKeyResponse {
            id: self.id,
            key_prefix: self.key_prefix,
            name: self.name,
            environment: self.environment,
            permissions: self.permissions,
            rate_limit_tier: self.rate_limit_tier,
            expires_at: self.expires_at,
            is_active: self.is_active,
            usage_count: self.usage_count,
            last_used: self.last_used,
            created_at: self.created_at,
        }
    }
}

/// Client-facing projection of [`ApiKey`] that omits `key_hash` and `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyResponse {
    pub id: Uuid,
    pub key_prefix: String,
    pub name: String,
    pub environment: ApiKeyEnvironment,
    pub permissions: Vec<Permission>,
    pub rate_limit_tier: ApiKeyTier,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub usage_count: i64,
    pub last_used: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
