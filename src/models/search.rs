// ABOUTME: Search request/response shapes exchanged with the Orchestrator (C5)
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// `natural` runs FULLTEXT/LIKE as typed; `semantic` first rewrites the query via the AI adapter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Natural,
    Semantic,
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Natural => write!(f, "natural"),
            Self::Semantic => write!(f, "semantic"),
        }
    }
}

impl Default for SearchMode {
    fn default() -> Self {
        Self::Natural
    }
}

fn default_limit() -> u32 {
    crate::constants::search::DEFAULT_LIMIT
}

/// Inbound search request (§3). `query` must be 1..=1000 chars and contain at
/// least one alphanumeric character; `limit` is clamped to `[1, 100]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(skip_deserializing, default)]
    pub user_id: Uuid,
    pub databases: Vec<String>,
    #[serde(default)]
    pub tables: Option<Vec<String>>,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub search_mode: SearchMode,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub include_analytics: bool,
}

/// One matched row, tagged with provenance and ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Synthetic `db_table_index` identifier, unique within a response.
    pub id: String,
    pub database: String,
    pub table: String,
    pub matched_columns: Vec<String>,
    pub relevance_score: f64,
    /// The row, minus internal bookkeeping fields (`table_name`, `relevance_score`).
    pub data: Value,
    pub snippet: Option<String>,
    pub categories: Vec<String>,
}

/// An AI- or popularity-derived category summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub count: u32,
    pub confidence: f64,
}

/// Query suggestion surfaced alongside results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    pub score: f64,
    pub r#type: SuggestionType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionType {
    Spelling,
    Semantic,
    Popular,
    Related,
}

/// A query-shape trend point, included when `include_analytics=true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub query_count: i64,
    pub avg_response_time: f64,
}

/// Optimisation hint attached to a response (§4.5 thresholds + AI-produced hints).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationHint {
    pub r#type: String,
    pub impact: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_suggestion: Option<String>,
}

/// The full response envelope for a search request (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub categories: Vec<Category>,
    pub suggestions: Vec<Suggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trends: Option<Vec<TrendPoint>>,
    pub query_optimization: Vec<OptimizationHint>,
    pub total_count: u64,
    pub execution_time_ms: u64,
    pub page: u32,
    pub limit: u32,
}
