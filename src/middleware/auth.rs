// ABOUTME: Authenticator (C9) — Axum extractor dispatching bearer tokens vs API keys
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Authentication middleware (§4.9). Two independent credential flows share
//! one entry point: a `Bearer <jwt>` header authenticates the management
//! plane (web/CLI users), an `X-Api-Key` header authenticates the data plane
//! (programmatic search/analytics callers) and additionally runs the rate
//! limiter inline so its decision can be recorded on the response.

use crate::api_keys::ApiKeyManager;
use crate::auth::{self, AuthManager};
use crate::cache::Cache;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::metadata_store::MetadataStore;
use crate::models::{ApiKey, Permission, UserRole};
use crate::rate_limiting::{self, RateLimitDecision};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::sync::Arc;
use uuid::Uuid;

const API_KEY_HEADER: &str = "x-api-key";

/// Shared state the auth extractor needs; stored once in the Axum router state.
#[derive(Clone)]
pub struct AuthState {
    pub auth_manager: Arc<AuthManager>,
    pub api_key_manager: Arc<ApiKeyManager>,
    pub store: MetadataStore,
    pub cache: Cache,
}

/// Identity established for a request, regardless of which flow produced it.
#[derive(Debug, Clone)]
pub enum Principal {
    /// Management-plane user, authenticated via bearer JWT.
    User { id: Uuid, email: String, role: UserRole },
    /// Data-plane caller, authenticated via API key. Carries the rate-limit
    /// decision so handlers/response layers can attach `X-RateLimit-*` headers.
    ApiKey { key: ApiKey, rate_limit: RateLimitDecision },
}

impl Principal {
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        match self {
            Self::User { id, .. } => *id,
            Self::ApiKey { key, .. } => key.user_id,
        }
    }

    /// # Errors
    ///
    /// Returns `INSUFFICIENT_PERMISSIONS` if the principal is an API key
    /// lacking the requested scope. Bearer-token users always pass; role
    /// checks for admin-only routes are enforced separately via
    /// [`auth::require_role`].
    pub fn require_permission(&self, permission: Permission) -> AppResult<()> {
        match self {
            Self::User { .. } => Ok(()),
            Self::ApiKey { key, .. } => {
                if key.has_permission(permission) {
                    Ok(())
                } else {
                    Err(AppError::new(
                        ErrorCode::InsufficientPermissions,
                        format!("API key lacks the {permission} permission"),
                    ))
                }
            }
        }
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
    AuthState: axum::extract::FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        if let Some(api_key_header) = parts.headers.get(API_KEY_HEADER) {
            let full_key = api_key_header
                .to_str()
                .map_err(|_| AppError::new(ErrorCode::InvalidApiKey, "API key header is not valid UTF-8"))?;
            return authenticate_api_key(&auth_state, full_key).await;
        }

        let header_value = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let token = auth::parse_bearer_header(header_value)?;
        let claims = auth_state.auth_manager.verify_token(&token)?;
        Ok(Self::User { id: claims.id, email: claims.email, role: claims.role })
    }
}

async fn authenticate_api_key(state: &AuthState, full_key: &str) -> AppResult<Principal> {
    ApiKeyManager::validate_format(full_key)?;
    let key_prefix = ApiKeyManager::prefix_of(full_key);
    let key_hash = state.api_key_manager.hash_key(full_key);

    let api_key = state
        .store
        .find_api_key(&key_prefix, &key_hash)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvalidApiKey, "API key not recognised"))?;

    if !api_key.is_active {
        return Err(AppError::new(ErrorCode::InvalidApiKey, "API key has been revoked"));
    }
    if api_key.is_expired() {
        return Err(AppError::new(ErrorCode::InvalidApiKey, "API key has expired"));
    }

    let decision = rate_limiting::check_and_increment(&state.cache, api_key.id, api_key.rate_limit_tier).await;
    if !decision.allowed {
        return Err(AppError::new(
            ErrorCode::RateLimitExceeded,
            format!("rate limit of {} requests/minute exceeded", decision.limit),
        ));
    }

    state
        .store
        .record_api_key_usage(api_key.id)
        .await
        .unwrap_or_else(|e| tracing::warn!(error = %e, "failed to record API key usage"));

    Ok(Principal::ApiKey { key: api_key, rate_limit: decision })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_principal_always_has_permission() {
        let principal = Principal::User {
            id: Uuid::new_v4(),
            email: "a@example.com".to_owned(),
            role: UserRole::User,
        };
        assert!(principal.require_permission(Permission::Admin).is_ok());
    }
}
