// ABOUTME: HTTP route tree — thin handlers delegating to the Orchestrator/Aggregator/Store
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Route wiring for the API surface described in §6. Handlers stay thin:
//! decode request, call one component method, wrap the result in the
//! response envelope.

mod analytics;
mod auth;
mod databases;
mod keys;
mod search;

use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::convert::Infallible;

/// Request id assigned by [`crate::middleware::MakeRequestUuid`] upstream,
/// propagated back via the `x-request-id` header (tower-http's
/// `PropagateRequestIdLayer`). Falls back to a fresh id if, somehow, the
/// layer wasn't run (e.g. in a handler unit test).
pub struct RequestId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for RequestId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| format!("req_{}", uuid::Uuid::new_v4().simple()));
        Ok(Self(id))
    }
}

/// Assemble the full route tree (§6).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search", post(search::search))
        .route("/search/suggestions", get(search::suggestions))
        .route("/search/analyze", post(search::analyze))
        .route("/search/trends", get(search::trends))
        .route("/search/history", get(search::history))
        .route("/analytics/popular-queries", get(analytics::popular_queries))
        .route("/analytics/performance", get(analytics::performance))
        .route("/analytics/trends", get(analytics::trends))
        .route("/analytics/history", get(analytics::history))
        .route("/analytics/admin/overview", get(analytics::admin_overview))
        .route("/analytics/admin/slow-queries", get(analytics::admin_slow_queries))
        .route("/databases", post(databases::create).get(databases::list))
        .route("/databases/status", get(databases::status))
        .route(
            "/databases/:id",
            get(databases::get).put(databases::update).delete(databases::remove),
        )
        .route("/databases/:id/test", post(databases::test))
        .route("/databases/:id/schema", get(databases::schema))
        .route("/keys", post(keys::create).get(keys::list))
        .route("/keys/:id", get(keys::get).delete(keys::remove))
        .route("/keys/:id/regenerate", post(keys::regenerate))
        .route("/keys/:id/usage", get(keys::usage))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/profile", get(auth::profile).put(auth::update_profile))
        .route("/auth/change-password", post(auth::change_password))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/account", delete(auth::delete_account))
        .with_state(state)
}
