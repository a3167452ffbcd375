// ABOUTME: Bearer-authenticated API-key management routes — CRUD, regenerate, usage
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use super::RequestId;
use crate::api_keys::parse_permissions;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::middleware::Principal;
use crate::models::{ApiKey, ApiKeyEnvironment, ApiKeyTier};
use crate::response::ok;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

async fn owned_key(state: &AppState, user_id: Uuid, id: Uuid) -> AppResult<ApiKey> {
    let key = state
        .store
        .get_api_key(id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::NotFound, "API key not found"))?;
    if key.user_id != user_id {
        return Err(AppError::new(ErrorCode::NotFound, "API key not found"));
    }
    Ok(key)
}

#[derive(Debug, Deserialize)]
pub struct CreateKeyRequest {
    pub name: String,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub rate_limit_tier: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub expires_at: Option<chrono::DateTime<Utc>>,
}

pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
    Json(body): Json<CreateKeyRequest>,
) -> AppResult<Response> {
    let environment = body
        .environment
        .as_deref()
        .map_or(ApiKeyEnvironment::Test, ApiKeyEnvironment::from_str_or_default);
    let tier = body
        .rate_limit_tier
        .as_deref()
        .map_or(ApiKeyTier::Free, ApiKeyTier::from_str_or_default);
    let permissions = parse_permissions(&body.permissions);

    let generated = state.api_key_manager.generate(environment);
    let now = Utc::now();
    let key = ApiKey {
        id: Uuid::new_v4(),
        user_id: principal.user_id(),
        key_prefix: generated.key_prefix,
        key_hash: generated.key_hash,
        name: body.name,
        environment,
        permissions,
        rate_limit_tier: tier,
        expires_at: body.expires_at,
        is_active: true,
        usage_count: 0,
        last_used: None,
        created_at: now,
    };
    state.store.create_api_key(&key).await?;

    Ok(ok(
        serde_json::json!({ "fullKey": generated.full_key, "key": key.into_response() }),
        request_id.0,
    ))
}

pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
) -> AppResult<Response> {
    let keys = state.store.list_api_keys_for_user(principal.user_id()).await?;
    let response: Vec<_> = keys.into_iter().map(ApiKey::into_response).collect();
    Ok(ok(response, request_id.0))
}

pub async fn get(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let key = owned_key(&state, principal.user_id(), id).await?;
    Ok(ok(key.into_response(), request_id.0))
}

pub async fn remove(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    owned_key(&state, principal.user_id(), id).await?;
    state.store.revoke_api_key(id).await?;
    Ok(ok(serde_json::json!({ "revoked": true }), request_id.0))
}

pub async fn regenerate(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let existing = owned_key(&state, principal.user_id(), id).await?;
    state.store.revoke_api_key(id).await?;

    let generated = state.api_key_manager.generate(existing.environment);
    let now = Utc::now();
    let key = ApiKey {
        id: Uuid::new_v4(),
        user_id: existing.user_id,
        key_prefix: generated.key_prefix,
        key_hash: generated.key_hash,
        name: existing.name,
        environment: existing.environment,
        permissions: existing.permissions,
        rate_limit_tier: existing.rate_limit_tier,
        expires_at: existing.expires_at,
        is_active: true,
        usage_count: 0,
        last_used: None,
        created_at: now,
    };
    state.store.create_api_key(&key).await?;

    Ok(ok(
        serde_json::json!({ "fullKey": generated.full_key, "key": key.into_response() }),
        request_id.0,
    ))
}

pub async fn usage(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let key = owned_key(&state, principal.user_id(), id).await?;
    Ok(ok(
        serde_json::json!({
            "usageCount": key.usage_count,
            "lastUsed": key.last_used,
            "rateLimitTier": key.rate_limit_tier,
        }),
        request_id.0,
    ))
}
