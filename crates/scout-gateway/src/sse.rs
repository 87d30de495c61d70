// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events streaming for POST /v1/chat.
//!
//! Each [`StreamEvent`] becomes one SSE event named after the event, with its
//! camelCase payload as the data line:
//! ```text
//! event: response_chunk
//! data: {"content":"Paris is "}
//! ```
//! Closing the connection drops the turn handle, which cancels the turn.

use std::convert::Infallible;

use axum::{
    Json,
    extract::State,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::StreamExt;
use tracing::debug;

use scout_agent::{StreamEvent, TurnRequest};

use crate::handlers::ApiError;
use crate::server::GatewayState;

/// Renders one event for the wire.
pub fn to_sse_event(event: &StreamEvent) -> Event {
    Event::default()
        .event(event.name())
        .data(event.payload().to_string())
}

/// POST /v1/chat
///
/// Invalid requests are answered with a 400 JSON body before any stream opens.
pub async fn post_chat(
    State(state): State<GatewayState>,
    Json(request): Json<TurnRequest>,
) -> Response {
    let handle = match state
        .coordinator
        .start(request, state.config.gateway.event_buffer)
    {
        Ok(handle) => handle,
        Err(err) => return ApiError::from(err).into_response(),
    };
    debug!(session_id = handle.session_id(), "streaming turn");

    let stream = handle
        .into_stream()
        .map(|event| Ok::<_, Infallible>(to_sse_event(&event)));
    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}
