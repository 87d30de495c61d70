// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use scout_agent::Coordinator;
use scout_config::ScoutConfig;
use scout_config::model::GatewayConfig;
use scout_core::{PluginAdapter, ScoutError};

use crate::handlers;
use crate::sse;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Runs turns and owns the memory and session stores.
    pub coordinator: Arc<Coordinator>,
    /// Adapters checked by `GET /health`.
    pub adapters: Arc<[Arc<dyn PluginAdapter>]>,
    /// Full configuration (event buffer, retrieval parameters).
    pub config: Arc<ScoutConfig>,
}

impl GatewayState {
    pub fn new(
        coordinator: Arc<Coordinator>,
        adapters: Vec<Arc<dyn PluginAdapter>>,
        config: ScoutConfig,
    ) -> Self {
        Self {
            coordinator,
            adapters: adapters.into(),
            config: Arc::new(config),
        }
    }
}

/// Builds the gateway router.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/v1/chat", post(sse::post_chat))
        .route(
            "/v1/memory",
            get(handlers::get_memory).delete(handlers::delete_memory),
        )
        .route("/v1/sessions/{id}", get(handlers::get_session))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds to `config.host:config.port` and serves until `shutdown` fires.
///
/// In-flight SSE streams are dropped on shutdown, which cancels their turns.
pub async fn serve(
    config: &GatewayConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), ScoutError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ScoutError::Config(format!("failed to bind gateway to {addr}: {e}")))?;

    info!(addr = %addr, "gateway server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| ScoutError::Internal(format!("gateway server error: {e}")))?;

    info!("gateway server stopped");
    Ok(())
}
