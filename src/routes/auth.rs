// ABOUTME: Management-plane account routes — register, login, profile, password, token lifecycle
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use super::RequestId;
use crate::constants::auth::BCRYPT_COST;
use crate::crypto::hashing::{hash_password, verify_password};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::middleware::Principal;
use crate::models::{User, UserRole};
use crate::response::ok;
use crate::state::AppState;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

fn user_only(principal: &Principal) -> AppResult<Uuid> {
    match principal {
        Principal::User { id, .. } => Ok(*id),
        Principal::ApiKey { .. } => Err(AppError::new(
            ErrorCode::Forbidden,
            "this route is bearer-authenticated only",
        )),
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(body): Json<RegisterRequest>,
) -> AppResult<Response> {
    if state.store.get_user_by_email(&body.email).await?.is_some() {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            "an account with this email already exists",
        ));
    }
    let password_hash = hash_password(&body.password, BCRYPT_COST)?;
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email: body.email,
        name: body.name,
        password_hash,
        role: UserRole::User,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    state.store.create_user(&user).await?;
    let token = state
        .auth_manager
        .issue_token(user.id, &user.email, &user.name, user.role)?;
    Ok(ok(
        serde_json::json!({ "token": token, "user": user.into_response() }),
        request_id.0,
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(body): Json<LoginRequest>,
) -> AppResult<Response> {
    let user = state
        .store
        .get_user_by_email(&body.email)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::new(ErrorCode::Unauthorized, "invalid email or password"))?;
    let valid = verify_password(&body.password, &user.password_hash)?;
    if !valid {
        return Err(AppError::new(ErrorCode::Unauthorized, "invalid email or password"));
    }
    let token = state
        .auth_manager
        .issue_token(user.id, &user.email, &user.name, user.role)?;
    Ok(ok(
        serde_json::json!({ "token": token, "user": user.into_response() }),
        request_id.0,
    ))
}

pub async fn profile(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
) -> AppResult<Response> {
    let user_id = user_only(&principal)?;
    let user = state
        .store
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;
    Ok(ok(user.into_response(), request_id.0))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub email: String,
}

pub async fn update_profile(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Response> {
    let user_id = user_only(&principal)?;
    state.store.update_user_profile(user_id, &body.name, &body.email).await?;
    let user = state
        .store
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;
    Ok(ok(user.into_response(), request_id.0))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
    Json(body): Json<ChangePasswordRequest>,
) -> AppResult<Response> {
    let user_id = user_only(&principal)?;
    let user = state
        .store
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;
    if !verify_password(&body.current_password, &user.password_hash)? {
        return Err(AppError::new(ErrorCode::Unauthorized, "current password is incorrect"));
    }
    let new_hash = hash_password(&body.new_password, BCRYPT_COST)?;
    state.store.update_password_hash(user_id, &new_hash).await?;
    Ok(ok(serde_json::json!({ "changed": true }), request_id.0))
}

/// Re-issues a token from the caller's existing, still-valid bearer claims.
/// There is no refresh-token store (§4.9); a token can only be refreshed
/// while it has not yet expired.
pub async fn refresh(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
) -> AppResult<Response> {
    let user_id = user_only(&principal)?;
    let user = state
        .store
        .get_user_by_id(user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::new(ErrorCode::Unauthorized, "account is no longer active"))?;
    let token = state
        .auth_manager
        .issue_token(user.id, &user.email, &user.name, user.role)?;
    Ok(ok(serde_json::json!({ "token": token }), request_id.0))
}

/// Bearer tokens are stateless; logout is a client-side no-op that still
/// requires a currently-valid token, matching §4.9's "no server-side session".
pub async fn logout(principal: Principal, request_id: RequestId) -> AppResult<Response> {
    user_only(&principal)?;
    Ok(ok(serde_json::json!({ "loggedOut": true }), request_id.0))
}

pub async fn delete_account(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
) -> AppResult<Response> {
    let user_id = user_only(&principal)?;
    state.store.deactivate_user(user_id).await?;
    Ok(ok(serde_json::json!({ "deleted": true }), request_id.0))
}
