// ABOUTME: AI Adapter (C10) request/response shapes — the six operations and their neutral defaults
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use crate::models::{Category, OptimizationHint, Suggestion};
use serde::{Deserialize, Serialize};

/// Result of [`crate::llm::LlmAdapter::rewrite_query`] (§4.10 `RewriteQuery`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteResult {
    pub optimized_query: String,
    #[serde(default)]
    pub concepts: Vec<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub intent: Option<String>,
}

impl RewriteResult {
    /// The neutral default: the original query unchanged, no derived concepts.
    #[must_use]
    pub fn neutral(original: &str) -> Self {
        Self {
            optimized_query: original.to_owned(),
            concepts: Vec::new(),
            synonyms: Vec::new(),
            intent: None,
        }
    }
}

/// Result of [`crate::llm::LlmAdapter::analyse`] (§4.10 `Analyse`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub optimizations: Vec<String>,
}

/// One row of [`crate::llm::LlmAdapter::insights`] (§4.10 `Insights`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub r#type: String,
    pub confidence: f64,
    pub description: String,
    pub actionable: bool,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Internal envelope mirrored from the wrapped shapes above, used only when
/// deserialising the raw chat-completions payload.
#[derive(Debug, Deserialize)]
pub(super) struct CategoriesEnvelope {
    pub categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SuggestionsEnvelope {
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OptimisationsEnvelope {
    pub optimizations: Vec<OptimizationHint>,
}

#[derive(Debug, Deserialize)]
pub(super) struct InsightsEnvelope {
    pub insights: Vec<Insight>,
}
