// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON request handlers: health, memory, and session transcripts.

use std::collections::BTreeSet;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::warn;

use scout_agent::{TranscriptTurn, is_valid_session_id};
use scout_core::{HealthStatus, ScoutError};
use scout_memory::{MemoryItem, ScoredMemory};

use crate::server::GatewayState;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A [`ScoutError`] rendered as a JSON error response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<ScoutError> for ApiError {
    fn from(err: ScoutError) -> Self {
        let status = match &err {
            ScoutError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ScoutError::Upstream { .. } | ScoutError::Timeout { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ScoutError::VersionConflict { .. } => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!(error = %err, "request failed");
        }
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Health of one adapter.
#[derive(Debug, Serialize)]
pub struct AdapterHealth {
    pub name: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when every adapter is healthy, `degraded` otherwise.
    pub status: &'static str,
    pub adapters: Vec<AdapterHealth>,
}

fn adapter_health(name: &str, result: Result<HealthStatus, ScoutError>) -> AdapterHealth {
    let (status, detail) = match result {
        Ok(HealthStatus::Healthy) => ("healthy", None),
        Ok(HealthStatus::Degraded(reason)) => ("degraded", Some(reason)),
        Ok(HealthStatus::Unhealthy(reason)) => ("unhealthy", Some(reason)),
        Err(err) => ("unhealthy", Some(err.to_string())),
    };
    AdapterHealth {
        name: name.to_string(),
        status,
        detail,
    }
}

/// GET /health
///
/// Checks every adapter concurrently. Answers 503 when any is unhealthy.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let checks = join_all(state.adapters.iter().map(|adapter| async move {
        adapter_health(adapter.name(), adapter.health_check().await)
    }))
    .await;

    let unhealthy = checks.iter().any(|c| c.status == "unhealthy");
    let degraded = unhealthy || checks.iter().any(|c| c.status == "degraded");
    let body = HealthResponse {
        status: if degraded { "degraded" } else { "ok" },
        adapters: checks,
    };
    let code = if unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (code, Json(body)).into_response()
}

/// Query parameters for GET /v1/memory.
#[derive(Debug, Default, Deserialize)]
pub struct MemoryQuery {
    /// Similarity query; omitted or blank lists every stored item.
    #[serde(default)]
    pub q: Option<String>,
}

/// A stored memory without its embedding.
#[derive(Debug, Serialize)]
pub struct MemoryView {
    pub id: u64,
    pub content: String,
    pub tags: BTreeSet<String>,
    pub importance: f32,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
}

impl From<MemoryItem> for MemoryView {
    fn from(item: MemoryItem) -> Self {
        Self {
            id: item.id,
            content: item.content,
            tags: item.tags,
            importance: item.importance,
            timestamp: item.timestamp,
            source: item.source,
            similarity: None,
        }
    }
}

impl From<ScoredMemory> for MemoryView {
    fn from(scored: ScoredMemory) -> Self {
        Self {
            similarity: Some(scored.similarity),
            ..Self::from(scored.item)
        }
    }
}

/// Response body for GET /v1/memory.
#[derive(Debug, Serialize)]
pub struct MemoryResponse {
    pub items: Vec<MemoryView>,
}

/// GET /v1/memory?q=
pub async fn get_memory(
    State(state): State<GatewayState>,
    Query(query): Query<MemoryQuery>,
) -> Result<Json<MemoryResponse>, ApiError> {
    let store = state
        .coordinator
        .memory()
        .ok_or_else(|| ApiError::not_found("memory is disabled"))?;

    let items = match query.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => {
            let memory = &state.config.memory;
            store
                .retrieve(q, memory.retrieval_k, memory.min_similarity)
                .await
                .into_iter()
                .map(MemoryView::from)
                .collect()
        }
        _ => store.items().await?.into_iter().map(MemoryView::from).collect(),
    };

    Ok(Json(MemoryResponse { items }))
}

/// DELETE /v1/memory
pub async fn delete_memory(State(state): State<GatewayState>) -> Result<StatusCode, ApiError> {
    let store = state
        .coordinator
        .memory()
        .ok_or_else(|| ApiError::not_found("memory is disabled"))?;
    store.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Response body for GET /v1/sessions/{id}.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
    pub turns: Vec<TranscriptTurn>,
}

/// GET /v1/sessions/{id}
pub async fn get_session(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    if !is_valid_session_id(&id) {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("invalid session id {id:?}"),
        ));
    }
    let transcript = state.coordinator.sessions().load(&id).await?;
    if transcript.turns.is_empty() {
        return Err(ApiError::not_found(format!("no session {id}")));
    }
    Ok(Json(SessionResponse {
        session_id: id,
        turns: transcript.turns,
    }))
}
