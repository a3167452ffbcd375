// ABOUTME: Main library entry point for the Altus4 search orchestration service
// ABOUTME: Multi-tenant REST API over MySQL-compatible FULLTEXT backends
//
// SPDX-License-Identifier: MIT OR Apache-2.0

// Crate-level attributes:
// - recursion_limit: Increased from default 128 for complex derive macros
//   (serde, thiserror) on deeply nested types like route response envelopes
// - deny(unsafe_code): Zero-tolerance unsafe policy.
#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # Altus4 Search Server
//!
//! A multi-tenant search orchestration service that fans a single query out
//! across each tenant's own MySQL-compatible `FULLTEXT` indexes, merges and
//! ranks the results, and optionally enriches the response with AI-assisted
//! suggestions.
//!
//! ## Architecture
//!
//! - **Metadata Store**: the system's own bookkeeping database — users, API
//!   keys, tenant connections, search analytics
//! - **Connection Registry**: pooled connections to each tenant's database
//! - **Search Orchestrator**: validation, cache lookup, fan-out, merge/rank
//! - **Cache Layer**: typed KV/counter/sorted-set facade over Redis or memory
//! - **AI Adapter**: fail-soft query rewriting, categorisation, suggestions
//! - **Authenticator**: bearer JWTs for the management plane, API keys for
//!   the data plane
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use altus4_server::config::environment::ServerConfig;
//! use altus4_server::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Altus4 configured with port: {}", config.port);
//!     Ok(())
//! }
//! ```

/// Search analytics aggregation over the Metadata Store
pub mod analytics;

/// API key generation, format validation, and permission parsing
pub mod api_keys;

/// Bearer-token issuance/verification for the management plane
pub mod auth;

/// Cache abstraction layer with pluggable backends
pub mod cache;

/// Configuration management and persistence
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Cryptographic utilities: secret encryption and password/key hashing
pub mod crypto;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// AI enrichment adapter: query rewriting, categorisation, suggestions
pub mod llm;

/// Production logging and structured output
pub mod logging;

/// File-based schema migration runner
pub mod migrations;

/// HTTP middleware: authentication extractors, CORS, request tracing
pub mod middleware;

/// Common data models shared across the application
pub mod models;

/// Persistent store for users, API keys, tenant connections, and analytics
pub mod metadata_store;

/// Search Orchestrator: fan-out, rank, paginate, snippet, degrade on partial failure
pub mod orchestrator;

/// Unified rate limiting for API keys
pub mod rate_limiting;

/// Pooled connections to tenant databases
pub mod registry;

/// Response envelope helpers (`{success, data, meta}` / `{success, error}`)
pub mod response;

/// `HTTP` route tree for the public API surface
pub mod routes;

/// Tenant database schema introspection
pub mod schema_inspector;

/// Shared application state threaded through the router
pub mod state;
