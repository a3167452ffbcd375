// ABOUTME: Data model module — the types shared across the Metadata Store, Orchestrator, and routes
// ABOUTME: Mirrors the teacher's flat models.rs layout, split per aggregate for readability
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Core data model (§3).

mod analytics;
mod api_key;
mod db_connection;
mod schema;
mod search;
mod user;

pub use analytics::AnalyticsEvent;
pub use api_key::{ApiKey, ApiKeyEnvironment, ApiKeyResponse, ApiKeyTier, Permission};
pub use db_connection::{ConnectionStatus, DbConnection, DbConnectionResponse};
pub use schema::{is_searchable_type, ColumnInfo, FulltextIndex, TableSchema};
pub use search::{
    Category, OptimizationHint, SearchMode, SearchRequest, SearchResponse, SearchResult,
    Suggestion, SuggestionType, TrendPoint,
};
pub use user::{User, UserResponse, UserRole};
