// ABOUTME: CORS layer configuration for the HTTP API
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Cross-origin configuration for browser-based API clients (§6).

use tower_http::cors::{Any, CorsLayer};

/// Allows cross-origin requests from any origin with the headers this API
/// actually reads: the management bearer token, the data-plane API key, and
/// standard content negotiation headers.
#[must_use]
pub fn setup_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
            axum::http::HeaderName::from_static("x-api-key"),
            axum::http::HeaderName::from_static("x-request-id"),
        ])
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
            axum::http::Method::PATCH,
        ])
}
