// ABOUTME: Bearer-authenticated database-connection routes — CRUD, test, schema, status
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use super::RequestId;
use crate::crypto::encrypt_secret;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::middleware::Principal;
use crate::models::{ConnectionStatus, DbConnection};
use crate::response::ok;
use crate::schema_inspector;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

async fn owned_connection(state: &AppState, user_id: Uuid, id: Uuid) -> AppResult<DbConnection> {
    let conn = state
        .store
        .get_db_connection(id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ConnectionNotFound, "connection not found"))?;
    if conn.user_id != user_id {
        return Err(AppError::new(ErrorCode::ConnectionNotFound, "connection not found"));
    }
    Ok(conn)
}

#[derive(Debug, Deserialize)]
pub struct CreateConnectionRequest {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub ssl_enabled: bool,
}

pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
    Json(body): Json<CreateConnectionRequest>,
) -> AppResult<Response> {
    let now = Utc::now();
    let password_encrypted = encrypt_secret(&body.password, &state.config.encryption_key)?;
    let conn = DbConnection {
        id: Uuid::new_v4(),
        user_id: principal.user_id(),
        name: body.name,
        host: body.host,
        port: body.port,
        database: body.database,
        username: body.username,
        password_encrypted,
        ssl_enabled: body.ssl_enabled,
        is_active: true,
        connection_status: ConnectionStatus::Unknown,
        last_tested: None,
        created_at: now,
        updated_at: now,
    };
    state.store.create_db_connection(&conn).await?;
    state.registry.add_connection(&conn).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, connection_id = %conn.id, "initial connection probe failed");
    });
    Ok(ok(conn.into_response(), request_id.0))
}

pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
) -> AppResult<Response> {
    let conns = state.store.list_db_connections_for_user(principal.user_id()).await?;
    let response: Vec<_> = conns.into_iter().map(DbConnection::into_response).collect();
    Ok(ok(response, request_id.0))
}

pub async fn get(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let conn = owned_connection(&state, principal.user_id(), id).await?;
    Ok(ok(conn.into_response(), request_id.0))
}

#[derive(Debug, Deserialize)]
pub struct UpdateConnectionRequest {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    /// Omitted (`null`) to keep the stored credential unchanged.
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub ssl_enabled: bool,
}

pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateConnectionRequest>,
) -> AppResult<Response> {
    let existing = owned_connection(&state, principal.user_id(), id).await?;
    let password_encrypted = match body.password {
        Some(plaintext) => encrypt_secret(&plaintext, &state.config.encryption_key)?,
        None => existing.password_encrypted,
    };
    state
        .store
        .update_db_connection(
            id,
            &body.name,
            &body.host,
            body.port,
            &body.database,
            &body.username,
            &password_encrypted,
            body.ssl_enabled,
        )
        .await?;
    state.registry.remove_connection(id);
    let updated = owned_connection(&state, principal.user_id(), id).await?;
    Ok(ok(updated.into_response(), request_id.0))
}

pub async fn remove(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    owned_connection(&state, principal.user_id(), id).await?;
    state.store.deactivate_db_connection(id).await?;
    state.registry.remove_connection(id);
    Ok(ok(serde_json::json!({ "deleted": true }), request_id.0))
}

pub async fn test(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    owned_connection(&state, principal.user_id(), id).await?;
    let healthy = state.registry.test_connection(id).await?;
    Ok(ok(serde_json::json!({ "healthy": healthy }), request_id.0))
}

pub async fn schema(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let conn = owned_connection(&state, principal.user_id(), id).await?;
    let pool = state.registry.get_connection(id).await?;
    let tables = schema_inspector::list_tables(&pool, &conn.database).await?;
    let mut schemas = Vec::with_capacity(tables.len());
    for table in &tables {
        schemas.push(schema_inspector::inspect_table(&pool, &conn.database, table).await?);
    }
    Ok(ok(schemas, request_id.0))
}

pub async fn status(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
) -> AppResult<Response> {
    let conns = state.store.list_db_connections_for_user(principal.user_id()).await?;
    let statuses = state.registry.connection_statuses().await;
    let result: Vec<_> = conns
        .into_iter()
        .map(|c| {
            serde_json::json!({
                "id": c.id,
                "name": c.name,
                "connectionStatus": c.connection_status,
                "live": statuses.get(&c.id).copied().unwrap_or(false),
            })
        })
        .collect();
    Ok(ok(result, request_id.0))
}
