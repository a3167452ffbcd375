// ABOUTME: Centralized error handling and error types for the Altus4 search service
// ABOUTME: Defines all error variants used across auth, orchestration, and REST routes
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Unified Error Handling System
//!
//! A single `AppError` type carries an [`ErrorCode`], a client-safe message,
//! a `retryable` hint, and follow-up `suggestions`. Internal detail never
//! reaches the client: [`ErrorResponse::from`] logs the full error at `warn`
//! before handing back the sanitized view.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Authentication & Authorization
    /// No `Authorization` header present at all
    NoToken,
    /// No `X-Api-Key` header present where one was required
    NoApiKey,
    /// Generic "not authenticated" catch-all
    Unauthorized,
    /// Bearer token failed signature/structure validation
    InvalidToken,
    /// Bearer token validated but is expired
    TokenExpired,
    /// API key does not match any stored hash
    InvalidApiKey,
    /// API key does not match the expected `altus4_sk_` shape
    InvalidApiKeyFormat,
    /// `Authorization` header present but neither `Bearer` nor recognised scheme
    InvalidAuthFormat,
    /// Authenticated, but not allowed to perform this action
    Forbidden,
    /// API key lacks the permission scope required for this route
    InsufficientPermissions,

    // Resource Management
    /// Requested resource was not found
    NotFound,
    /// Referenced database connection id does not exist (or isn't owned by caller)
    ConnectionNotFound,

    // Validation
    /// Generic request validation failure
    ValidationError,
    /// Input value was well-formed JSON but semantically invalid
    InvalidInput,
    /// Request body was not valid JSON
    InvalidJson,
    /// `rate_limit_tier` value is not one of the recognised tiers
    InvalidRateLimitTier,
    /// `permissions` value contains an unrecognised scope
    InvalidPermissions,
    /// Search query exceeded the maximum accepted length
    QueryTooLong,
    /// Search query contained disallowed characters
    QueryInvalidChars,

    // Tenant database connectivity
    /// Tenant database refused the connection outright
    ConnectionRefused,
    /// Tenant database credentials were rejected
    AuthenticationFailed,
    /// Tenant database host could not be resolved/reached
    HostNotFound,
    /// Named database does not exist on the tenant host
    DatabaseNotFound,
    /// Tenant database operation exceeded its timeout budget
    Timeout,
    /// Tenant database requires `TLS` but the connection wasn't secured
    SslRequired,
    /// Tenant database host rejected a new connection (pool/server exhausted)
    TooManyConnections,
    /// Tenant database user lacks privilege for the attempted statement
    PermissionDenied,

    // Search orchestration
    /// Every target database failed during fan-out
    SearchAllDatabasesFailed,
    /// Orchestration failed for a reason not covered by a more specific code
    SearchFailed,

    // Rate limiting
    /// Caller's request rate exceeded their tier's budget
    RateLimitExceeded,

    // Internal Errors
    /// Internal server error
    InternalError,
    /// Metadata-store operation failed
    DatabaseError,
    /// Configuration error occurred
    ConfigError,
    /// Serialization/deserialization failed
    SerializationError,
    /// Upstream `LLM` provider call failed or timed out
    ExternalServiceError,
}

impl ErrorCode {
    /// Get the `HTTP` status code for this error
    #[must_use]
    pub const fn http_status(self) -> u16 {
        use crate::constants::http_status as s;
        match self {
            Self::NoToken
            | Self::NoApiKey
            | Self::Unauthorized
            | Self::InvalidToken
            | Self::TokenExpired
            | Self::InvalidApiKey
            | Self::InvalidApiKeyFormat
            | Self::InvalidAuthFormat => s::UNAUTHORIZED,

            Self::Forbidden | Self::InsufficientPermissions | Self::PermissionDenied => {
                s::FORBIDDEN
            }

            Self::NotFound | Self::ConnectionNotFound | Self::DatabaseNotFound => s::NOT_FOUND,

            Self::ValidationError
            | Self::InvalidInput
            | Self::InvalidJson
            | Self::InvalidRateLimitTier
            | Self::InvalidPermissions
            | Self::QueryTooLong
            | Self::QueryInvalidChars => s::BAD_REQUEST,

            Self::ConnectionRefused | Self::SslRequired => s::BAD_GATEWAY,

            Self::AuthenticationFailed => s::UNAUTHORIZED,

            Self::HostNotFound => s::NOT_FOUND,

            Self::Timeout => s::REQUEST_TIMEOUT,

            Self::RateLimitExceeded => s::TOO_MANY_REQUESTS,

            Self::SearchAllDatabasesFailed
            | Self::ExternalServiceError
            | Self::TooManyConnections => s::SERVICE_UNAVAILABLE,

            Self::SearchFailed
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::SerializationError => s::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code string sent to clients (e.g. `"INVALID_TOKEN"`)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoToken => "NO_TOKEN",
            Self::NoApiKey => "NO_API_KEY",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidApiKey => "INVALID_API_KEY",
            Self::InvalidApiKeyFormat => "INVALID_API_KEY_FORMAT",
            Self::InvalidAuthFormat => "INVALID_AUTH_FORMAT",
            Self::Forbidden => "FORBIDDEN",
            Self::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            Self::NotFound => "NOT_FOUND",
            Self::ConnectionNotFound => "CONNECTION_NOT_FOUND",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidInput => "INVALID_INPUT",
            Self::InvalidJson => "INVALID_JSON",
            Self::InvalidRateLimitTier => "INVALID_RATE_LIMIT_TIER",
            Self::InvalidPermissions => "INVALID_PERMISSIONS",
            Self::QueryTooLong => "QUERY_TOO_LONG",
            Self::QueryInvalidChars => "QUERY_INVALID_CHARS",
            Self::ConnectionRefused => "CONNECTION_REFUSED",
            Self::AuthenticationFailed => "AUTHENTICATION_FAILED",
            Self::HostNotFound => "HOST_NOT_FOUND",
            Self::DatabaseNotFound => "DATABASE_NOT_FOUND",
            Self::Timeout => "TIMEOUT",
            Self::SslRequired => "SSL_REQUIRED",
            Self::TooManyConnections => "TOO_MANY_CONNECTIONS",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::SearchAllDatabasesFailed => "SEARCH_ALL_DATABASES_FAILED",
            Self::SearchFailed => "SEARCH_FAILED",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::SerializationError => "SERIALIZATION_ERROR",
            Self::ExternalServiceError => "EXTERNAL_SERVICE_ERROR",
        }
    }

    fn from_str_code(s: &str) -> Option<Self> {
        Some(match s {
            "NO_TOKEN" => Self::NoToken,
            "NO_API_KEY" => Self::NoApiKey,
            "UNAUTHORIZED" => Self::Unauthorized,
            "INVALID_TOKEN" => Self::InvalidToken,
            "TOKEN_EXPIRED" => Self::TokenExpired,
            "INVALID_API_KEY" => Self::InvalidApiKey,
            "INVALID_API_KEY_FORMAT" => Self::InvalidApiKeyFormat,
            "INVALID_AUTH_FORMAT" => Self::InvalidAuthFormat,
            "FORBIDDEN" => Self::Forbidden,
            "INSUFFICIENT_PERMISSIONS" => Self::InsufficientPermissions,
            "NOT_FOUND" => Self::NotFound,
            "CONNECTION_NOT_FOUND" => Self::ConnectionNotFound,
            "VALIDATION_ERROR" => Self::ValidationError,
            "INVALID_INPUT" => Self::InvalidInput,
            "INVALID_JSON" => Self::InvalidJson,
            "INVALID_RATE_LIMIT_TIER" => Self::InvalidRateLimitTier,
            "INVALID_PERMISSIONS" => Self::InvalidPermissions,
            "QUERY_TOO_LONG" => Self::QueryTooLong,
            "QUERY_INVALID_CHARS" => Self::QueryInvalidChars,
            "CONNECTION_REFUSED" => Self::ConnectionRefused,
            "AUTHENTICATION_FAILED" => Self::AuthenticationFailed,
            "HOST_NOT_FOUND" => Self::HostNotFound,
            "DATABASE_NOT_FOUND" => Self::DatabaseNotFound,
            "TIMEOUT" => Self::Timeout,
            "SSL_REQUIRED" => Self::SslRequired,
            "TOO_MANY_CONNECTIONS" => Self::TooManyConnections,
            "PERMISSION_DENIED" => Self::PermissionDenied,
            "SEARCH_ALL_DATABASES_FAILED" => Self::SearchAllDatabasesFailed,
            "SEARCH_FAILED" => Self::SearchFailed,
            "RATE_LIMIT_EXCEEDED" => Self::RateLimitExceeded,
            "INTERNAL_ERROR" => Self::InternalError,
            "DATABASE_ERROR" => Self::DatabaseError,
            "CONFIG_ERROR" => Self::ConfigError,
            "SERIALIZATION_ERROR" => Self::SerializationError,
            "EXTERNAL_SERVICE_ERROR" => Self::ExternalServiceError,
            _ => return None,
        })
    }

    /// Whether a client can reasonably retry the same request unchanged
    /// (true for transient tenant-connectivity and upstream failures).
    #[must_use]
    pub const fn default_retryable(self) -> bool {
        matches!(
            self,
            Self::Timeout
                | Self::ConnectionRefused
                | Self::TooManyConnections
                | Self::SearchAllDatabasesFailed
                | Self::ExternalServiceError
                | Self::RateLimitExceeded
        )
    }

    /// Default user-friendly description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::NoToken => "No authentication token was provided",
            Self::NoApiKey => "No API key was provided",
            Self::Unauthorized => "Authentication is required to access this resource",
            Self::InvalidToken => "The provided authentication token is invalid",
            Self::TokenExpired => "The authentication token has expired",
            Self::InvalidApiKey => "The provided API key is invalid",
            Self::InvalidApiKeyFormat => "The API key format is not recognised",
            Self::InvalidAuthFormat => "The Authorization header format is not recognised",
            Self::Forbidden => "You do not have permission to perform this action",
            Self::InsufficientPermissions => "This API key lacks the required permission",
            Self::NotFound => "The requested resource was not found",
            Self::ConnectionNotFound => "The referenced database connection was not found",
            Self::ValidationError => "The request failed validation",
            Self::InvalidInput => "The provided input is invalid",
            Self::InvalidJson => "The request body is not valid JSON",
            Self::InvalidRateLimitTier => "The rate limit tier is not recognised",
            Self::InvalidPermissions => "One or more permission scopes are not recognised",
            Self::QueryTooLong => "The search query exceeds the maximum allowed length",
            Self::QueryInvalidChars => "The search query contains disallowed characters",
            Self::ConnectionRefused => "The target database refused the connection",
            Self::AuthenticationFailed => "The target database rejected the credentials",
            Self::HostNotFound => "The target database host could not be reached",
            Self::DatabaseNotFound => "The named database does not exist",
            Self::Timeout => "The operation timed out",
            Self::SslRequired => "The target database requires a TLS connection",
            Self::TooManyConnections => "The target database rejected the connection (too many connections)",
            Self::PermissionDenied => "The database user lacks the required privilege",
            Self::SearchAllDatabasesFailed => "All target databases failed to return results",
            Self::SearchFailed => "The search could not be completed",
            Self::RateLimitExceeded => "Rate limit exceeded. Please slow down your requests",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "A metadata store operation failed",
            Self::ConfigError => "A configuration error occurred",
            Self::SerializationError => "Data serialization/deserialization failed",
            Self::ExternalServiceError => "An external service encountered an error",
        }
    }

    /// Follow-up suggestions surfaced to the client alongside the error
    #[must_use]
    pub fn default_suggestions(self) -> Vec<String> {
        let s: &[&str] = match self {
            Self::NoToken => &["Include an Authorization: Bearer <token> header"],
            Self::NoApiKey => &["Include an X-Api-Key header"],
            Self::InvalidToken | Self::TokenExpired => &["Log in again to obtain a new token"],
            Self::InvalidApiKey | Self::InvalidApiKeyFormat => {
                &["Check the API key value", "Keys look like altus4_sk_<env>_<secret>"]
            }
            Self::InsufficientPermissions => {
                &["Request a key with the required permission scope"]
            }
            Self::QueryTooLong => &["Shorten the search query"],
            Self::QueryInvalidChars => &["Remove control characters from the search query"],
            Self::RateLimitExceeded => &["Retry after the window indicated by Retry-After"],
            Self::ConnectionRefused | Self::HostNotFound | Self::Timeout => {
                &["Verify the database host, port, and network reachability"]
            }
            Self::AuthenticationFailed => &["Verify the stored database username and password"],
            Self::SslRequired => &["Enable ssl_enabled for this connection"],
            Self::SearchAllDatabasesFailed => {
                &["Check connection health with GET /databases/:id/status"]
            }
            _ => &[],
        };
        s.iter().map(|s| (*s).to_owned()).collect()
    }
}

impl Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str_code(&s).ok_or_else(|| serde::de::Error::unknown_variant(&s, &[]))
    }
}

/// Application error carried through `Result` chains and mapped to an `HTTP` response
/// at the route boundary.
#[derive(Debug, Clone, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message (may contain internal detail; sanitized on response)
    pub message: String,
    /// Whether the client can retry the same request unchanged
    pub retryable: bool,
    /// Follow-up suggestions surfaced to the client
    pub suggestions: Vec<String>,
    /// Optional request `ID` for tracing
    pub request_id: Option<String>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message, using the code's defaults
    /// for `retryable` and `suggestions`.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.default_retryable(),
            suggestions: code.default_suggestions(),
            request_id: None,
        }
    }

    /// Override the `retryable` hint
    #[must_use]
    pub const fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Replace the suggestions list
    #[must_use]
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// Add a request `ID` to the error
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Get the `HTTP` status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Get sanitized message safe for client exposure; internal variants fall back
    /// to the error code's generic description.
    #[must_use]
    pub fn sanitized_message(&self) -> String {
        match self.code {
            ErrorCode::InternalError | ErrorCode::DatabaseError | ErrorCode::ConfigError => {
                self.code.description().to_owned()
            }
            _ => self.message.clone(),
        }
    }

    /// Full error details for internal logging. NEVER send this to clients.
    #[must_use]
    pub fn internal_details(&self) -> String {
        format!("{:?}: {}", self.code, self.message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// `HTTP` error response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message (sanitized for client)
    pub message: String,
    /// Whether the client can retry the same request unchanged
    pub retryable: bool,
    /// Follow-up suggestions
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    /// Optional request ID for error tracking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// RFC3339 timestamp when the error occurred
    pub timestamp: String,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        tracing::warn!("API error: {}", error.internal_details());

        Self {
            code: error.code,
            message: error.sanitized_message(),
            retryable: error.retryable,
            suggestions: error.suggestions.clone(),
            request_id: error.request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Top-level failure envelope (§6): `{success: false, error: {...}}`.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorResponse,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorEnvelope { success: false, error: ErrorResponse::from(self) };
        (status, Json(body)).into_response()
    }
}

/// Convenience constructors for common errors
impl AppError {
    /// No credentials supplied at all
    #[must_use]
    pub fn no_token() -> Self {
        Self::new(ErrorCode::NoToken, "Authentication required")
    }

    /// Bearer token failed validation
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidToken, message)
    }

    /// Bearer token expired
    #[must_use]
    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired, "Authentication token has expired")
    }

    /// API key failed validation
    #[must_use]
    pub fn invalid_api_key(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidApiKey, message)
    }

    /// Caller lacks the permission scope required for this route
    #[must_use]
    pub fn insufficient_permissions(permission: impl Into<String>) -> Self {
        let permission = permission.into();
        Self::new(
            ErrorCode::InsufficientPermissions,
            format!("Missing required permission: {permission}"),
        )
    }

    /// Rate limit exceeded
    #[must_use]
    pub fn rate_limit_exceeded(limit: u32) -> Self {
        Self::new(
            ErrorCode::RateLimitExceeded,
            format!("Rate limit of {limit} requests/minute exceeded"),
        )
    }

    /// Resource not found
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        let resource = resource.into();
        Self::new(ErrorCode::NotFound, format!("{resource} not found"))
    }

    /// Invalid input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Internal server error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Metadata store error
    #[must_use]
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// External (`LLM`) service error
    #[must_use]
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        let service = service.into();
        let message = message.into();
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{service}: {message}"),
        )
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::new(ErrorCode::InternalError, error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::new(ErrorCode::InternalError, format!("IO error: {error}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::InvalidJson, format!("JSON error: {error}"))
    }
}

impl From<uuid::Error> for AppError {
    fn from(error: uuid::Error) -> Self {
        Self::new(ErrorCode::InvalidInput, format!("UUID error: {error}"))
    }
}

impl From<chrono::ParseError> for AppError {
    fn from(error: chrono::ParseError) -> Self {
        Self::new(
            ErrorCode::InvalidInput,
            format!("Date parse error: {error}"),
        )
    }
}

/// Maps `SQLx` database errors onto the tenant-connectivity taxonomy where
/// `MySQL` gives us a distinguishable error code, falling back to `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &error {
            if let Some(code) = db_err.code() {
                return match code.as_ref() {
                    "1045" => Self::new(ErrorCode::AuthenticationFailed, db_err.message()),
                    "1049" => Self::new(ErrorCode::DatabaseNotFound, db_err.message()),
                    "1044" | "1142" => Self::new(ErrorCode::PermissionDenied, db_err.message()),
                    "1040" => Self::new(ErrorCode::TooManyConnections, db_err.message()),
                    _ => Self::new(ErrorCode::DatabaseError, db_err.message().to_owned()),
                };
            }
        }
        match error {
            sqlx::Error::PoolTimedOut => Self::new(ErrorCode::Timeout, "connection pool timed out"),
            sqlx::Error::Io(ref io_err) => {
                Self::new(ErrorCode::ConnectionRefused, io_err.to_string())
            }
            sqlx::Error::RowNotFound => Self::new(ErrorCode::NotFound, "row not found"),
            other => Self::new(ErrorCode::DatabaseError, other.to_string()),
        }
    }
}
