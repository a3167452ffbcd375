// ABOUTME: AI Adapter (C10) — timeout-bounded, fail-soft wrapper over a chat-completions LLM
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use super::types::{
    AnalysisResult, CategoriesEnvelope, Insight, InsightsEnvelope, OptimisationsEnvelope,
    RewriteResult, SuggestionsEnvelope,
};
use crate::models::{Category, OptimizationHint, Suggestion};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Thin, timeout-bounded wrapper over an external chat-completions LLM (§4.10).
///
/// Every method short-circuits to its neutral default when the adapter is
/// unavailable (no API key configured), the call times out, the transport
/// fails, or the response is not strictly-parseable JSON matching the
/// expected shape.
pub struct LlmAdapter {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

impl LlmAdapter {
    #[must_use]
    pub fn new(api_key: Option<String>, model: String, timeout_ms: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Availability is purely a function of configuration (§4.10).
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete_and_parse<T: DeserializeOwned>(&self, system_prompt: &str, user_prompt: String) -> Option<T> {
        let api_key = self.api_key.as_ref()?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system_prompt.to_owned() },
                ChatMessage { role: "user", content: user_prompt },
            ],
            response_format: Some(serde_json::json!({ "type": "json_object" })),
        };

        let call = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send();

        let response = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "llm: transport error, using neutral default");
                return None;
            }
            Err(_) => {
                tracing::warn!("llm: call timed out, using neutral default");
                return None;
            }
        };

        let body: ChatResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = %e, "llm: non-JSON envelope, using neutral default");
                return None;
            }
        };

        let content = body.choices.first()?.message.content.as_str();
        match serde_json::from_str(content) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(error = %e, "llm: response did not match expected schema, using neutral default");
                None
            }
        }
    }

    /// `RewriteQuery(q) -> {optimized_query, concepts[], synonyms[], intent}` (§4.10).
    pub async fn rewrite_query(&self, query: &str) -> RewriteResult {
        if !self.is_available() {
            return RewriteResult::neutral(query);
        }
        self.complete_and_parse(
            "Rewrite the user's search query for a MySQL FULLTEXT search. \
             Respond as JSON: {\"optimized_query\": string, \"concepts\": string[], \
             \"synonyms\": string[], \"intent\": string}.",
            query.to_owned(),
        )
        .await
        .unwrap_or_else(|| RewriteResult::neutral(query))
    }

    /// `CategoriseResults(results) -> [{name, count, confidence}]` (§4.10).
    pub async fn categorise_results(&self, result_summaries: &[String]) -> Vec<Category> {
        if !self.is_available() || result_summaries.is_empty() {
            return Vec::new();
        }
        let prompt = format!(
            "Categorise these search results. Respond as JSON: {{\"categories\": \
             [{{\"name\": string, \"count\": number, \"confidence\": number}}]}}.\n\n{}",
            result_summaries.join("\n")
        );
        self.complete_and_parse::<CategoriesEnvelope>(
            "You categorise search results into short thematic labels.",
            prompt,
        )
        .await
        .map(|env| env.categories)
        .unwrap_or_default()
    }

    /// `Suggest(q) -> [{text, score, type}]` (§4.10).
    pub async fn suggest(&self, query: &str) -> Vec<Suggestion> {
        if !self.is_available() {
            return Vec::new();
        }
        let prompt = format!(
            "Suggest alternative search queries for: {query}. Respond as JSON: \
             {{\"suggestions\": [{{\"text\": string, \"score\": number, \
             \"type\": \"spelling\"|\"semantic\"|\"popular\"|\"related\"}}]}}."
        );
        self.complete_and_parse::<SuggestionsEnvelope>(
            "You suggest alternative search queries.",
            prompt,
        )
        .await
        .map(|env| env.suggestions)
        .unwrap_or_default()
    }

    /// `Optimise(sql, execution_time_ms, result_count) -> [{type, description, impact, sql_suggestion?}]` (§4.10).
    pub async fn optimise(&self, sql: &str, execution_time_ms: u64, result_count: u64) -> Vec<OptimizationHint> {
        if !self.is_available() {
            return Vec::new();
        }
        let prompt = format!(
            "SQL: {sql}\nExecution time (ms): {execution_time_ms}\nResult count: {result_count}\n\
             Respond as JSON: {{\"optimizations\": [{{\"type\": string, \"description\": string, \
             \"impact\": string, \"sql_suggestion\": string|null}}]}}."
        );
        self.complete_and_parse::<OptimisationsEnvelope>(
            "You suggest query optimisations for slow MySQL FULLTEXT searches.",
            prompt,
        )
        .await
        .map(|env| env.optimizations)
        .unwrap_or_default()
    }

    /// `Analyse(sql) -> {recommendations[], optimizations[]}` (§4.10).
    pub async fn analyse(&self, sql: &str) -> AnalysisResult {
        if !self.is_available() {
            return AnalysisResult::default();
        }
        let prompt = format!(
            "Analyse this SQL for correctness and performance: {sql}\n\
             Respond as JSON: {{\"recommendations\": string[], \"optimizations\": string[]}}."
        );
        self.complete_and_parse::<AnalysisResult>("You analyse MySQL queries.", prompt)
            .await
            .unwrap_or_default()
    }

    /// `Insights(queries[], period) -> [{type, confidence, description, actionable, data}]` (§4.10).
    pub async fn insights(&self, queries: &[String], period: &str) -> Vec<Insight> {
        if !self.is_available() || queries.is_empty() {
            return Vec::new();
        }
        let prompt = format!(
            "Queries over {period}:\n{}\nRespond as JSON: {{\"insights\": \
             [{{\"type\": string, \"confidence\": number, \"description\": string, \
             \"actionable\": boolean, \"data\": object}}]}}.",
            queries.join("\n")
        );
        self.complete_and_parse::<InsightsEnvelope>(
            "You derive usage insights from a list of recent search queries.",
            prompt,
        )
        .await
        .map(|env| env.insights)
        .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unavailable_adapter_returns_neutral_defaults() {
        let adapter = LlmAdapter::new(None, "gpt-3.5-turbo".to_owned(), 1000);
        assert!(!adapter.is_available());

        let rewrite = adapter.rewrite_query("hello world").await;
        assert_eq!(rewrite.optimized_query, "hello world");
        assert!(rewrite.concepts.is_empty());

        assert!(adapter.categorise_results(&["a row".to_owned()]).await.is_empty());
        assert!(adapter.suggest("hello").await.is_empty());
        assert!(adapter.optimise("SELECT 1", 10, 1).await.is_empty());
        assert!(adapter.analyse("SELECT 1").await.recommendations.is_empty());
        assert!(adapter.insights(&["q".to_owned()], "7d").await.is_empty());
    }
}
