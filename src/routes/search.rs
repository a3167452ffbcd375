// ABOUTME: Data-plane search routes — /search, /search/suggestions, /analyze, /trends, /history
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use super::RequestId;
use crate::analytics;
use crate::errors::AppResult;
use crate::middleware::Principal;
use crate::models::{Permission, SearchMode, SearchRequest};
use crate::response::{ok, with_rate_limit_headers};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

fn with_rate_limit_if_api_key(response: Response, principal: &Principal) -> Response {
    match principal {
        Principal::ApiKey { rate_limit, .. } => with_rate_limit_headers(response, rate_limit),
        Principal::User { .. } => response,
    }
}

pub async fn search(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
    Json(mut request): Json<SearchRequest>,
) -> AppResult<Response> {
    principal.require_permission(Permission::Search)?;
    request.user_id = principal.user_id();
    let response = state.orchestrator.search(request).await?;
    Ok(with_rate_limit_if_api_key(ok(response, request_id.0), &principal))
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    query: String,
    #[serde(default)]
    databases: Vec<String>,
    #[serde(default)]
    tables: Vec<String>,
}

pub async fn suggestions(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
    Query(params): Query<SuggestionsQuery>,
) -> AppResult<Response> {
    principal.require_permission(Permission::Search)?;
    let request = SearchRequest {
        query: params.query,
        user_id: principal.user_id(),
        databases: params.databases,
        tables: if params.tables.is_empty() { None } else { Some(params.tables) },
        columns: None,
        search_mode: SearchMode::Natural,
        limit: crate::constants::search::DEFAULT_LIMIT,
        offset: 0,
        include_analytics: false,
    };
    let response = state.orchestrator.search(request).await?;
    let suggestions = response.suggestions;
    Ok(with_rate_limit_if_api_key(ok(suggestions, request_id.0), &principal))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    sql: String,
}

pub async fn analyze(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
    Json(body): Json<AnalyzeRequest>,
) -> AppResult<Response> {
    principal.require_permission(Permission::Analytics)?;
    let result = state.llm.analyse(&body.sql).await;
    Ok(with_rate_limit_if_api_key(ok(result, request_id.0), &principal))
}

pub async fn trends(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
) -> AppResult<Response> {
    principal.require_permission(Permission::Analytics)?;
    let (start, end) = analytics::default_range();
    let trends = state.analytics.time_series(principal.user_id(), start, end).await?;
    Ok(with_rate_limit_if_api_key(ok(trends, request_id.0), &principal))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_history_limit() -> i64 {
    50
}

pub async fn history(
    State(state): State<AppState>,
    principal: Principal,
    request_id: RequestId,
    Query(params): Query<HistoryQuery>,
) -> AppResult<Response> {
    principal.require_permission(Permission::Search)?;
    let events = state.analytics.history(principal.user_id(), params.limit, params.offset).await?;
    Ok(with_rate_limit_if_api_key(ok(events, request_id.0), &principal))
}
