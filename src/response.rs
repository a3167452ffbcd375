// ABOUTME: Success response envelope and rate-limit header helpers shared by all routes
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! The success half of §6's response envelope. The failure half lives next to
//! [`crate::errors::AppError`] since `IntoResponse` needs it there.

use crate::rate_limiting::RateLimitDecision;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// `meta` block attached to every successful response (§6).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub timestamp: String,
    pub request_id: String,
    pub version: &'static str,
}

impl Meta {
    #[must_use]
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            request_id: request_id.into(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// `{success: true, data, meta}` envelope (§6).
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub meta: Meta,
}

/// Wrap `data` in the success envelope using the request id propagated via
/// `x-request-id` (falls back to a fresh id if the header is absent, which
/// should not happen once [`crate::middleware::MakeRequestUuid`] is wired in).
#[must_use]
pub fn ok<T: Serialize>(data: T, request_id: impl Into<String>) -> Response {
    Json(Envelope { success: true, data, meta: Meta::new(request_id) }).into_response()
}

/// Attach `X-RateLimit-Tier|Limit|Remaining` headers to a response for
/// API-key-authenticated routes (§4.8, §6).
pub fn with_rate_limit_headers(mut response: Response, decision: &RateLimitDecision) -> Response {
    let headers = response.headers_mut();
    if let Ok(v) = HeaderValue::from_str(&decision.tier.to_string()) {
        headers.insert("x-ratelimit-tier", v);
    }
    headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    response
}
