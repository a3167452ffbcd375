// ABOUTME: System-wide constants and configuration values for the Altus4 search service
// ABOUTME: Timeouts, pool limits, cache TTLs, and key/token prefixes used across components
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Constants Module
//!
//! Hardcoded defaults and small environment-overridable knobs. Values that a
//! deployer would reasonably want to tune live in [`crate::config::environment`]
//! instead; this module holds the constants referenced directly by component
//! code (query limits, http status codes, key prefixes).

/// Server identity
pub mod server {
    /// Server version, from Cargo.toml
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    /// Default HTTP port
    pub const DEFAULT_PORT: u16 = 3000;
}

/// `HTTP` status codes used by [`crate::errors::ErrorCode`]
pub mod http_status {
    pub const BAD_REQUEST: u16 = 400;
    pub const UNAUTHORIZED: u16 = 401;
    pub const FORBIDDEN: u16 = 403;
    pub const NOT_FOUND: u16 = 404;
    pub const CONFLICT: u16 = 409;
    pub const REQUEST_TIMEOUT: u16 = 408;
    pub const TOO_MANY_REQUESTS: u16 = 429;
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
    pub const BAD_GATEWAY: u16 = 502;
    pub const SERVICE_UNAVAILABLE: u16 = 503;
}

/// Search orchestrator limits (§4.5)
pub mod search {
    /// Maximum accepted query length in characters
    pub const MAX_QUERY_LEN: usize = 1000;
    /// Default page size when the caller omits `limit`
    pub const DEFAULT_LIMIT: u32 = 20;
    /// Maximum page size
    pub const MAX_LIMIT: u32 = 100;
    /// Execution time above which an "add an index" hint is raised
    pub const SLOW_QUERY_MS: u64 = 5000;
    /// Window width (characters) on each side of a matched term in a snippet
    pub const SNIPPET_WINDOW: usize = 50;
    /// Minimum text length required for a term-anchored snippet
    pub const SNIPPET_MIN_LEN: usize = 50;
    /// Minimum text length required for the fallback (untargeted) snippet
    pub const SNIPPET_FALLBACK_MIN_LEN: usize = 20;
    /// Truncation length for the fallback snippet
    pub const SNIPPET_FALLBACK_MAX_LEN: usize = 100;
    /// Number of suggestions returned in a `SearchResponse`
    pub const MAX_SUGGESTIONS: usize = 5;
    /// Overall per-request deadline covering validation through analytics
    /// append, milliseconds (§5)
    pub const REQUEST_DEADLINE_MS: u64 = 30_000;
}

/// Connection pool defaults (§5, recognised configuration options)
pub mod pool {
    /// Per-tenant pool size cap
    pub const MAX_CONNECTIONS: u32 = 5;
    /// Dial timeout, milliseconds
    pub const CONNECT_TIMEOUT_MS: u64 = 60_000;
    /// Pool-slot acquire timeout, milliseconds
    pub const ACQUIRE_TIMEOUT_MS: u64 = 60_000;
}

/// Cache TTLs and key prefixes (§4.6)
pub mod cache {
    /// Search response cache TTL, seconds
    pub const TTL_SEARCH_SECS: u64 = 300;
    /// Default in-memory cache capacity when no Redis URL is configured
    pub const DEFAULT_MAX_ENTRIES: usize = 10_000;
    /// Cache key prefix for search responses
    pub const SEARCH_PREFIX: &str = "search:";
    /// Cache key prefix for session blobs
    pub const SESSION_PREFIX: &str = "session:";
    /// Cache key prefix for per-query popularity counters
    pub const POPULARITY_PREFIX: &str = "query_popularity:";
    /// Cache key prefix for a user's recent-query sorted set
    pub const RECENT_QUERIES_PREFIX: &str = "recent_queries:";
    /// Cache key prefix for rate-limit counters
    pub const RATE_LIMIT_PREFIX: &str = "rate_limit:";
}

/// Rate-limit tier budgets (§4.8)
pub mod rate_limit {
    /// Requests/minute for the `free` tier
    pub const FREE_PER_MIN: u32 = 60;
    /// Requests/minute for the `pro` tier
    pub const PRO_PER_MIN: u32 = 600;
    /// Requests/minute for the `enterprise` tier (effectively unmetered)
    pub const ENTERPRISE_PER_MIN: u32 = 50_000;
    /// Sliding window width, seconds
    pub const WINDOW_SECS: u64 = 60;
}

/// API key / token prefixes (§4.9)
pub mod key_prefixes {
    /// Stable prefix preceding the environment segment
    pub const API_KEY_PREFIX: &str = "altus4_sk_";
    /// Number of characters (from the start of the full key) stored as the
    /// public lookup prefix
    pub const PREFIX_LEN: usize = 16;
}

/// `LLM` adapter defaults (§5)
pub mod llm {
    /// Per-call timeout, milliseconds
    pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
    /// Default chat-completions model identifier
    pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
}

/// Authentication defaults (§4.9)
pub mod auth {
    /// `bcrypt` work factor for user account passwords
    pub const BCRYPT_COST: u32 = 10;
}

/// Metadata-store migration bookkeeping (§4.2)
pub mod migrations {
    /// Table recording applied migrations
    pub const TABLE: &str = "migrations";
}
