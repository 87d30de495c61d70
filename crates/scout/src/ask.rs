// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `scout ask` command: runs one turn and prints its events as JSON lines.

use std::io::Write;
use std::sync::Arc;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::info;

use scout_agent::{Coordinator, StreamEvent, TurnRequest};
use scout_core::ScoutError;

/// One output line: `{"event": <name>, "data": <payload>}`.
pub fn event_line(event: &StreamEvent) -> String {
    json!({ "event": event.name(), "data": event.payload() }).to_string()
}

/// Streams one turn to `out`. Returns whether the turn completed.
///
/// Cancelling `shutdown` stops printing and drops the turn, which cancels it.
pub async fn run_ask<W: Write>(
    coordinator: &Arc<Coordinator>,
    request: TurnRequest,
    buffer: usize,
    out: &mut W,
    shutdown: &CancellationToken,
) -> Result<bool, ScoutError> {
    let mut handle = coordinator.start(request, buffer)?;
    let mut completed = false;

    loop {
        let event = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                info!(session_id = handle.session_id(), "turn interrupted");
                break;
            }
            event = handle.next_event() => event,
        };
        let Some(event) = event else { break };

        completed = matches!(event, StreamEvent::Complete(_));
        writeln!(out, "{}", event_line(&event))
            .map_err(|e| ScoutError::Internal(format!("failed to write event: {e}")))?;
    }

    out.flush()
        .map_err(|e| ScoutError::Internal(format!("failed to flush output: {e}")))?;
    Ok(completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_test_utils::TestHarness;

    #[tokio::test]
    async fn prints_one_json_line_per_event() {
        let harness = TestHarness::builder().build().await.unwrap();
        let mut out = Vec::new();
        let completed = run_ask(
            &harness.coordinator,
            TurnRequest::new("What is 2 + 2?"),
            16,
            &mut out,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert!(completed);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["event"], "thinking_start");
        assert_eq!(lines[0]["data"]["phase"], "analysis");
        let last = lines.last().unwrap();
        assert_eq!(last["event"], "complete");
        assert_eq!(last["data"]["usedSearch"], false);
    }

    #[tokio::test]
    async fn invalid_request_prints_nothing() {
        let harness = TestHarness::builder().build().await.unwrap();
        let mut out = Vec::new();
        let err = run_ask(
            &harness.coordinator,
            TurnRequest::new(""),
            16,
            &mut out,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScoutError::InvalidRequest(_)));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn cancelled_shutdown_stops_early() {
        let harness = TestHarness::builder().build().await.unwrap();
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let mut out = Vec::new();
        let completed = run_ask(
            &harness.coordinator,
            TurnRequest::new("What is 2 + 2?"),
            16,
            &mut out,
            &shutdown,
        )
        .await
        .unwrap();
        assert!(!completed);
        assert!(out.is_empty());
    }
}
