// ABOUTME: HTTP middleware — authentication extractor, CORS, request correlation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

pub mod auth;
pub mod cors;
pub mod tracing;

pub use auth::{AuthState, Principal};
pub use cors::setup_cors;
pub use tracing::{create_database_span, create_request_span, MakeRequestUuid, RequestContext};
