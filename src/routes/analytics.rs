// ABOUTME: Bearer-authenticated analytics routes — user-scoped reads plus admin-only rollups
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use super::RequestId;
use crate::analytics::default_range;
use crate::auth::require_role;
use crate::errors::AppResult;
use crate::middleware::Principal;
use crate::models::UserRole;
use crate::response::ok;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    limit: Option<i64>,
}

pub async fn popular_queries(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
    Query(params): Query<RangeQuery>,
) -> AppResult<Response> {
    let (start, end) = default_range();
    let limit = params.limit.unwrap_or(10);
    let result = state.analytics.popular_queries(principal.user_id(), start, end, limit).await?;
    Ok(ok(result, request_id.0))
}

pub async fn performance(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
) -> AppResult<Response> {
    let (start, end) = default_range();
    let result = state.analytics.performance_summary(principal.user_id(), start, end).await?;
    Ok(ok(result, request_id.0))
}

pub async fn trends(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
) -> AppResult<Response> {
    let (start, end) = default_range();
    let result = state.analytics.time_series(principal.user_id(), start, end).await?;
    Ok(ok(result, request_id.0))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    50
}

pub async fn history(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
    Query(params): Query<HistoryQuery>,
) -> AppResult<Response> {
    let result = state.analytics.history(principal.user_id(), params.limit, params.offset).await?;
    Ok(ok(result, request_id.0))
}

pub async fn admin_overview(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
) -> AppResult<Response> {
    require_role(role_of(&principal), UserRole::Admin)?;
    let (start, end) = default_range();
    let result = state.analytics.system_overview(start, end).await?;
    Ok(ok(result, request_id.0))
}

pub async fn admin_slow_queries(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
) -> AppResult<Response> {
    require_role(role_of(&principal), UserRole::Admin)?;
    let (start, end) = default_range();
    let result = state.analytics.slowest_queries(start, end).await?;
    Ok(ok(result, request_id.0))
}

/// API keys carry no [`UserRole`]; they can never satisfy an admin-only route.
fn role_of(principal: &Principal) -> UserRole {
    match principal {
        Principal::User { role, .. } => *role,
        Principal::ApiKey { .. } => UserRole::User,
    }
}
