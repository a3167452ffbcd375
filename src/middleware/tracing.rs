// ABOUTME: Request correlation — request-id generation and structured HTTP spans
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Request tracing (§6 `meta.requestId`). Every request gets a `req_<uuid>`
//! identifier, either inherited from an inbound `x-request-id` header or
//! generated fresh, and a [`tower_http::trace::TraceLayer`] span carrying it
//! plus method/path/status/latency.

use axum::http::HeaderValue;
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Request context threaded through handlers via an Axum extension, carrying
/// whatever the Authenticator established about the caller (§4.9).
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: String,
    pub user_id: Option<Uuid>,
    pub auth_method: Option<String>,
}

impl RequestContext {
    #[must_use]
    pub fn new(request_id: String) -> Self {
        Self { request_id, user_id: None, auth_method: None }
    }

    #[must_use]
    pub fn with_auth(mut self, user_id: Uuid, auth_method: String) -> Self {
        self.user_id = Some(user_id);
        self.auth_method = Some(auth_method);
        self
    }

    pub fn record_in_span(&self) {
        let span = Span::current();
        span.record("request_id", &self.request_id);
        if let Some(user_id) = &self.user_id {
            span.record("user_id", user_id.to_string());
        }
        if let Some(auth_method) = &self.auth_method {
            span.record("auth_method", auth_method);
        }
    }
}

/// [`MakeRequestId`] that generates a `req_<uuid-simple>` identifier, matching
/// the format the original request-context type used.
#[derive(Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = format!("req_{}", Uuid::new_v4().simple());
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Span for one HTTP request, pre-populated with the request id (§6). Used as
/// the `make_span_with` callback of the [`tower_http::trace::TraceLayer`]
/// assembled in the server binary, paired with an `on_response` callback that
/// records `status_code`/`duration_ms` into the returned span.
pub fn create_request_span(method: &str, path: &str, request_id: &str) -> Span {
    tracing::info_span!(
        "http_request",
        method = %method,
        path = %path,
        request_id = %request_id,
        user_id = tracing::field::Empty,
        auth_method = tracing::field::Empty,
        status_code = tracing::field::Empty,
        duration_ms = tracing::field::Empty,
    )
}

/// Span for a single fan-out query against one target database (§4.5).
pub fn create_database_span(operation: &str, database: &str) -> Span {
    tracing::debug_span!(
        "database_operation",
        operation = %operation,
        database = %database,
        duration_ms = tracing::field::Empty,
        rows_returned = tracing::field::Empty,
    )
}
