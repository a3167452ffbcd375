// ABOUTME: Search Orchestrator (C5) — fan-out, rank, paginate, snippet, degrade on partial failure
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! The Search Orchestrator (§4.5). Owns the whole request lifecycle from
//! validation through cache lookup, fan-out, merge/rank, enrichment, and
//! post-processing.

mod mapping;
mod sql;
mod validate;

use crate::cache::{popularity_key, recent_queries_key, search_cache_key, Cache};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::llm::LlmAdapter;
use crate::metadata_store::MetadataStore;
use crate::models::{
    AnalyticsEvent, Category, OptimizationHint, SearchMode, SearchRequest, SearchResponse,
    SearchResult, Suggestion, SuggestionType,
};
use crate::registry::ConnectionRegistry;
use crate::schema_inspector;
use chrono::Utc;
use futures_util::future::join_all;
use sqlx::mysql::MySqlPool;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Everything the Orchestrator needs to reach C3/C4/C6/C7/C10 (§4.5 data flow).
#[derive(Clone)]
pub struct Orchestrator {
    registry: Arc<ConnectionRegistry>,
    store: MetadataStore,
    cache: Cache,
    llm: Arc<LlmAdapter>,
}

/// Outcome of fanning out to a single target database.
struct DatabaseOutcome {
    results: Vec<SearchResult>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>, store: MetadataStore, cache: Cache, llm: Arc<LlmAdapter>) -> Self {
        Self { registry, store, cache, llm }
    }

    /// Run a full search request through the pipeline described in §4.5,
    /// bounded end-to-end by a single request-scoped deadline (§5): validation,
    /// cache lookup, semantic rewrite, fan-out, ranking, enrichment, and the
    /// analytics append all share one budget rather than each leg racing its
    /// own independent clock.
    ///
    /// # Errors
    ///
    /// Returns `QUERY_TOO_LONG`/`QUERY_INVALID_CHARS` on validation failure,
    /// `SEARCH_ALL_DATABASES_FAILED` when every fan-out task errors, or
    /// `TIMEOUT` if the whole pipeline doesn't finish within the deadline.
    pub async fn search(&self, request: SearchRequest) -> AppResult<SearchResponse> {
        let deadline = std::time::Duration::from_millis(crate::constants::search::REQUEST_DEADLINE_MS);
        match tokio::time::timeout(deadline, self.search_inner(request)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::new(
                ErrorCode::Timeout,
                "search did not complete within the request deadline",
            )),
        }
    }

    async fn search_inner(&self, request: SearchRequest) -> AppResult<SearchResponse> {
        match validate::validate(&request)? {
            validate::Validation::EmptyQuery => return Ok(empty_response(&[])),
            validate::Validation::NoDatabases => {
                return Ok(empty_response(&[OptimizationHint {
                    r#type: "query".to_owned(),
                    impact: "medium".to_owned(),
                    description: "No databases specified...".to_owned(),
                    sql_suggestion: None,
                }]));
            }
            validate::Validation::Proceed => {}
        }

        let cache_key = search_cache_key(
            &request.query,
            &request.databases,
            request.tables.as_deref().unwrap_or_default(),
            request.columns.as_deref().unwrap_or_default(),
            &request.search_mode.to_string(),
            request.limit,
            request.offset,
        );

        if !request.include_analytics {
            if let Some(cached) = self.cache.get::<SearchResponse>(&cache_key).await {
                return Ok(cached);
            }
        }

        let started = Instant::now();

        let working_query = if request.search_mode == SearchMode::Semantic && self.llm.is_available() {
            self.llm.rewrite_query(&request.query).await.optimized_query
        } else {
            request.query.clone()
        };

        let user_id = request.user_id;
        let tasks = request.databases.iter().cloned().map(|database| {
            let this = self.clone();
            let query = working_query.clone();
            let tables = request.tables.clone();
            let columns = request.columns.clone();
            let limit = request.limit;
            let offset = request.offset;
            tokio::spawn(async move { this.search_one_database(user_id, &database, &query, tables, columns, limit, offset).await })
        });

        let joined = join_all(tasks).await;
        let mut outcomes = Vec::new();
        let mut failures = 0usize;
        for joined_result in joined {
            match joined_result {
                Ok(Ok(outcome)) => outcomes.push(outcome),
                Ok(Err(e)) => {
                    failures += 1;
                    tracing::warn!(error = %e, "fan-out task failed");
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!(error = %e, "fan-out task panicked");
                }
            }
        }

        if outcomes.is_empty() && failures > 0 {
            return Err(AppError::new(
                ErrorCode::SearchAllDatabasesFailed,
                "every target database failed",
            ));
        }

        let mut merged: Vec<SearchResult> = outcomes.into_iter().flat_map(|o| o.results).collect();
        merged.sort_by(|a, b| b.relevance_score.partial_cmp(&a.relevance_score).unwrap_or(std::cmp::Ordering::Equal));
        let total_count = merged.len() as u64;

        let start = request.offset as usize;
        let end = (start + request.limit as usize).min(merged.len());
        let mut page_results = if start < merged.len() { merged[start..end].to_vec() } else { Vec::new() };

        let categories = self.categorise(&page_results).await;
        for result in &mut page_results {
            result.categories = categories.iter().map(|c| c.name.clone()).collect();
        }

        let suggestions = self.suggestions(&working_query, &request.user_id).await;

        let trends = if request.include_analytics {
            let end_range = Utc::now();
            let start_range = end_range - chrono::Duration::days(7);
            self.store.time_series(request.user_id, start_range, end_range).await.ok()
        } else {
            None
        };

        let execution_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let mut hints = optimisation_hints(execution_time_ms, total_count);
        if execution_time_ms > crate::constants::search::SLOW_QUERY_MS && self.llm.is_available() {
            hints.extend(self.llm.optimise(&working_query, execution_time_ms, total_count).await);
        }

        let page = (request.offset / request.limit.max(1)) + 1;

        let response = SearchResponse {
            results: page_results,
            categories,
            suggestions,
            trends,
            query_optimization: hints,
            total_count,
            execution_time_ms,
            page,
            limit: request.limit,
        };

        if !request.include_analytics {
            self.cache.set(&cache_key, &response, Some(std::time::Duration::from_secs(crate::constants::cache::TTL_SEARCH_SECS))).await;
        }

        self.cache.incr(&popularity_key(&request.query)).await;
        self.cache
            .zadd(&recent_queries_key(&request.user_id), Utc::now().timestamp() as f64, &request.query)
            .await;

        self.store
            .append_analytics_event(&AnalyticsEvent {
                id: Uuid::new_v4(),
                user_id: request.user_id,
                query_text: request.query.clone(),
                search_mode: request.search_mode.to_string(),
                database_id: request.databases.first().and_then(|d| Uuid::parse_str(d).ok()),
                result_count: response.total_count,
                execution_time_ms: response.execution_time_ms,
                created_at: Utc::now(),
            })
            .await
            .unwrap_or_else(|e| tracing::warn!(error = %e, "analytics append failed"));

        Ok(response)
    }

    async fn search_one_database(
        &self,
        user_id: Uuid,
        database: &str,
        query: &str,
        tables: Option<Vec<String>>,
        columns: Option<Vec<String>>,
        limit: u32,
        offset: u32,
    ) -> AppResult<DatabaseOutcome> {
        let connection_id = Uuid::parse_str(database)
            .map_err(|_| AppError::new(ErrorCode::ConnectionNotFound, "database identifier is not a valid connection id"))?;
        let conn = self.store.get_active_db_connection(connection_id).await?
            .ok_or_else(|| AppError::new(ErrorCode::ConnectionNotFound, "connection not found or inactive"))?;
        if conn.user_id != user_id {
            return Err(AppError::new(ErrorCode::ConnectionNotFound, "connection not found or inactive"));
        }
        let pool = self.registry.get_connection(connection_id).await?;

        let table_names = match tables {
            Some(ts) => ts,
            None => schema_inspector::list_tables(&pool, &conn.database).await.unwrap_or_default(),
        };

        let mut selects = Vec::new();
        for table in &table_names {
            if let Some(select) = self.build_table_select(&pool, &conn.database, table, columns.as_deref(), query).await {
                selects.push(select);
            }
        }

        if selects.is_empty() {
            return Ok(DatabaseOutcome { results: Vec::new() });
        }

        let (union_sql, binds) = sql::union_and_paginate(selects, limit, offset);
        let mut q = sqlx::query(&union_sql);
        for bind in &binds {
            q = q.bind(bind);
        }
        let rows = q.fetch_all(&pool).await?;

        let results = rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let json_row = mapping::row_to_json(row);
                let table_name = json_row
                    .get("table_name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown")
                    .to_owned();
                mapping::to_search_result(&json_row, &conn.name, &table_name, index, query)
            })
            .collect();

        Ok(DatabaseOutcome { results })
    }

    async fn build_table_select(
        &self,
        pool: &MySqlPool,
        database: &str,
        table: &str,
        requested_columns: Option<&[String]>,
        query: &str,
    ) -> Option<sql::TableSelect> {
        let schema = schema_inspector::inspect_table(pool, database, table).await.ok()?;

        if !schema.fulltext_indexes.is_empty() {
            for index in &schema.fulltext_indexes {
                let cols: Vec<String> = match requested_columns {
                    Some(requested) => index.columns.iter().filter(|c| requested.contains(c)).cloned().collect(),
                    None => index.columns.clone(),
                };
                if !cols.is_empty() {
                    return Some(sql::fulltext_select(table, &cols, query));
                }
            }
            return None;
        }

        let candidate: Vec<String> = match requested_columns {
            Some(requested) => requested.to_vec(),
            None => schema.searchable_columns().into_iter().map(ToOwned::to_owned).collect(),
        };
        if candidate.is_empty() {
            return None;
        }
        Some(sql::like_select(table, &candidate, query))
    }

    async fn categorise(&self, results: &[SearchResult]) -> Vec<Category> {
        if results.is_empty() {
            return Vec::new();
        }
        let summaries: Vec<String> = results.iter().filter_map(|r| r.snippet.clone()).collect();
        self.llm.categorise_results(&summaries).await
    }

    async fn suggestions(&self, query: &str, user_id: &Uuid) -> Vec<Suggestion> {
        let mut suggestions = self.llm.suggest(query).await;

        let recent = self.cache.zrevrange(&recent_queries_key(user_id), 0, 9).await;
        for text in recent {
            if text != query {
                suggestions.push(Suggestion { text, score: 0.5, r#type: SuggestionType::Popular });
            }
        }

        let mut seen = std::collections::HashSet::new();
        suggestions.retain(|s| seen.insert(s.text.clone()));
        suggestions.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        suggestions.truncate(crate::constants::search::MAX_SUGGESTIONS);
        suggestions
    }
}

fn optimisation_hints(execution_time_ms: u64, total_count: u64) -> Vec<OptimizationHint> {
    let mut hints = Vec::new();
    if execution_time_ms > crate::constants::search::SLOW_QUERY_MS {
        hints.push(OptimizationHint {
            r#type: "index".to_owned(),
            impact: "high".to_owned(),
            description: "Query took longer than 5s; consider adding or reviewing FULLTEXT indexes".to_owned(),
            sql_suggestion: None,
        });
    }
    if total_count == 0 {
        hints.push(OptimizationHint {
            r#type: "query".to_owned(),
            impact: "medium".to_owned(),
            description: "No results; broaden terms".to_owned(),
            sql_suggestion: None,
        });
    }
    hints
}

fn empty_response(hints: &[OptimizationHint]) -> SearchResponse {
    SearchResponse {
        results: Vec::new(),
        categories: Vec::new(),
        suggestions: Vec::new(),
        trends: None,
        query_optimization: hints.to_vec(),
        total_count: 0,
        execution_time_ms: 0,
        page: 1,
        limit: crate::constants::search::DEFAULT_LIMIT,
    }
}
