// ABOUTME: Shared application state threaded through every Axum route handler
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use crate::analytics::AnalyticsAggregator;
use crate::api_keys::ApiKeyManager;
use crate::auth::AuthManager;
use crate::cache::Cache;
use crate::config::ServerConfig;
use crate::llm::LlmAdapter;
use crate::metadata_store::MetadataStore;
use crate::middleware::AuthState;
use crate::orchestrator::Orchestrator;
use crate::registry::ConnectionRegistry;
use axum::extract::FromRef;
use std::sync::Arc;

/// Everything route handlers need, cloned cheaply per request (every field is
/// an `Arc`/handle-wrapper already).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: MetadataStore,
    pub cache: Cache,
    pub registry: Arc<ConnectionRegistry>,
    pub orchestrator: Orchestrator,
    pub analytics: AnalyticsAggregator,
    pub auth_manager: Arc<AuthManager>,
    pub api_key_manager: Arc<ApiKeyManager>,
    pub llm: Arc<LlmAdapter>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            auth_manager: state.auth_manager.clone(),
            api_key_manager: state.api_key_manager.clone(),
            store: state.store.clone(),
            cache: state.cache.clone(),
        }
    }
}
