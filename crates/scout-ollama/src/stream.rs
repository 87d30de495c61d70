// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! NDJSON stream parser for streamed `/api/chat` responses.

use std::pin::Pin;
use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use scout_core::{ChatChunk, ChunkStream, ScoutError};
use tracing::debug;

use crate::types::ChatStreamLine;

type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, reqwest::Error>> + Send>>;

struct LineState {
    bytes: ByteStream,
    buf: Vec<u8>,
    idle: Duration,
    finished: bool,
}

/// Converts a streaming reqwest response into chat chunks.
///
/// Each newline-terminated JSON object becomes one [`ChatChunk`]. If no bytes
/// arrive for `idle`, the stream yields a timeout error and ends.
pub fn parse_ndjson_stream(response: reqwest::Response, idle: Duration) -> ChunkStream {
    let bytes: ByteStream = Box::pin(response.bytes_stream().map(|r| r.map(|b| b.to_vec())));
    chunks_from_bytes(bytes, idle)
}

fn chunks_from_bytes(bytes: ByteStream, idle: Duration) -> ChunkStream {
    let state = LineState {
        bytes,
        buf: Vec::new(),
        idle,
        finished: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if state.finished {
                return None;
            }

            if let Some(pos) = state.buf.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = state.buf.drain(..=pos).collect();
                match parse_line(&line) {
                    Some(item) => {
                        state.finished = !matches!(&item, Ok(chunk) if !chunk.done);
                        return Some((item, state));
                    }
                    None => continue,
                }
            }

            match tokio::time::timeout(state.idle, state.bytes.next()).await {
                Ok(Some(Ok(bytes))) => state.buf.extend_from_slice(&bytes),
                Ok(Some(Err(e))) => {
                    state.finished = true;
                    let err = ScoutError::Upstream {
                        service: "ollama".into(),
                        message: format!("stream interrupted: {e}"),
                        source: Some(Box::new(e)),
                    };
                    return Some((Err(err), state));
                }
                Ok(None) => {
                    state.finished = true;
                    let rest = std::mem::take(&mut state.buf);
                    return parse_line(&rest).map(|item| (item, state));
                }
                Err(_) => {
                    state.finished = true;
                    debug!(idle = ?state.idle, "chat stream went idle");
                    let err = ScoutError::Timeout {
                        operation: "chat stream".into(),
                        duration: state.idle,
                    };
                    return Some((Err(err), state));
                }
            }
        }
    }))
}

/// Parses one NDJSON line. Blank lines yield `None`.
fn parse_line(line: &[u8]) -> Option<Result<ChatChunk, ScoutError>> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let parsed = match serde_json::from_str::<ChatStreamLine>(text) {
        Ok(parsed) => parsed,
        Err(e) => {
            return Some(Err(ScoutError::Parse(format!(
                "invalid chat stream line: {e}"
            ))));
        }
    };

    if let Some(error) = parsed.error {
        return Some(Err(ScoutError::upstream("ollama", error)));
    }

    Some(Ok(ChatChunk {
        content: parsed.message.map(|m| m.content).unwrap_or_default(),
        done: parsed.done,
    }))
}
