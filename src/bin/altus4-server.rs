// ABOUTME: Server binary — wires config, stores, cache, and routes, then serves HTTP
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

#![forbid(unsafe_code)]

//! # Altus4 Server Binary
//!
//! Boots the search orchestration service: loads configuration, connects to
//! the metadata store and cache, hydrates the connection registry, and
//! serves the REST API described in the route tree.

use altus4_server::api_keys::ApiKeyManager;
use altus4_server::auth::AuthManager;
use altus4_server::cache::{Cache, CacheConfig};
use altus4_server::config::environment::ServerConfig;
use altus4_server::llm::LlmAdapter;
use altus4_server::logging;
use altus4_server::metadata_store::MetadataStore;
use altus4_server::middleware::{create_database_span, create_request_span, setup_cors, MakeRequestUuid};
use altus4_server::orchestrator::Orchestrator;
use altus4_server::registry::ConnectionRegistry;
use altus4_server::routes;
use altus4_server::state::AppState;
use altus4_server::analytics::AnalyticsAggregator;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Span};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env()?;
    logging::init_from_env()?;
    info!("starting altus4-server: {}", config.summary());

    let state = bootstrap(&config).await?;
    let app = routes::router(state)
        .layer(setup_cors())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");
                    create_request_span(request.method().as_str(), request.uri().path(), request_id)
                })
                .on_response(|response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                    let _entered = span.enter();
                    tracing::info!(
                        status = response.status().as_u16(),
                        duration_ms = latency.as_millis() as u64,
                        "request completed"
                    );
                }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    info!("listening on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn bootstrap(config: &ServerConfig) -> Result<AppState> {
    let store = MetadataStore::connect(&config.database.to_connection_string()).await?;
    info!("metadata store connected");

    let cache = Cache::new(CacheConfig {
        redis_url: Some(config.cache.to_connection_string()),
        ..CacheConfig::default()
    })
    .await?;
    info!("cache initialized");

    let registry = Arc::new(ConnectionRegistry::new(store.clone(), config.encryption_key.clone()));
    let llm = Arc::new(LlmAdapter::new(
        config.llm.api_key.clone(),
        config.llm.model.clone(),
        config.llm.timeout_ms,
    ));
    let orchestrator = Orchestrator::new(registry.clone(), store.clone(), cache.clone(), llm.clone());
    let analytics = AnalyticsAggregator::new(store.clone(), cache.clone());
    let auth_manager = Arc::new(AuthManager::new(config.auth.jwt_secret.clone()));
    let api_key_manager = Arc::new(ApiKeyManager::new());

    // Exercise the database-span helper once at startup so it's reachable
    // from the binary as intended, independent of any request.
    let _ = create_database_span("health_check", &config.database.database);
    store.health_check().await.context("metadata store health check failed")?;

    Ok(AppState {
        config: Arc::new(config.clone()),
        store,
        cache,
        registry,
        orchestrator,
        analytics,
        auth_manager,
        api_key_manager,
        llm,
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutdown signal received, draining in-flight requests");
}
