// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events emitted while a turn runs.
//!
//! Each event has a wire name (`thinking_start`, `response_chunk`, ...) and a
//! camelCase JSON payload. Events for one turn are delivered in emission
//! order and never batched.

use serde::Serialize;

use scout_core::{Complexity, SearchResult, Thought};

/// A phase that exposes its reasoning through `thinking_*` events.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Analysis,
    SearchDecision,
    SearchPlanning,
    Evaluation,
}

/// Phase-specific output attached to a `thinking_update`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PhaseDetail {
    #[serde(rename_all = "camelCase")]
    Analysis {
        summary: String,
        complexity: Complexity,
    },
    #[serde(rename_all = "camelCase")]
    SearchDecision {
        needs_search: bool,
        confidence: f32,
        reasoning: String,
    },
    #[serde(rename_all = "camelCase")]
    SearchPlanning { queries: Vec<String> },
    #[serde(rename_all = "camelCase")]
    Evaluation { assessment: String },
}

/// A source cited in the final summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    pub title: String,
    pub url: String,
}

impl From<&SearchResult> for Source {
    fn from(result: &SearchResult) -> Self {
        Self {
            title: result.title.clone(),
            url: result.url.clone(),
        }
    }
}

/// Aggregate counters carried by the `complete` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnSummary {
    pub used_search: bool,
    pub sources: Vec<Source>,
    pub source_count: usize,
    pub thought_count: usize,
    pub memory_items_added: usize,
    pub memories_used: usize,
    pub elapsed_ms: u64,
    pub queries_used: Vec<String>,
    pub search_rounds: usize,
    pub session_id: String,
}

/// One step of a turn as seen by the client.
#[derive(Debug, Clone, PartialEq, Serialize, strum::IntoStaticStr)]
#[serde(untagged)]
#[strum(serialize_all = "snake_case")]
pub enum StreamEvent {
    ThinkingStart {
        phase: Phase,
    },
    ThinkingUpdate {
        phase: Phase,
        thoughts: Vec<Thought>,
        #[serde(flatten)]
        detail: PhaseDetail,
    },
    #[serde(rename_all = "camelCase")]
    SearchStart {
        round: usize,
        query: String,
    },
    #[serde(rename_all = "camelCase")]
    SearchResults {
        round: usize,
        query: String,
        results: Vec<SearchResult>,
        total_results: usize,
        continue_searching: bool,
        reasoning: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        /// Set when the round failed.
        thoughts: Vec<Thought>,
    },
    #[serde(rename_all = "camelCase")]
    ContentProcessing {
        pages_requested: usize,
        pages_extracted: usize,
    },
    #[serde(rename_all = "camelCase")]
    ResponseGeneration {
        memories_used: usize,
        source_count: usize,
        plan: String,
        thoughts: Vec<Thought>,
    },
    ResponseChunk {
        content: String,
    },
    ResponseComplete {
        content: String,
        /// Reasoning blocks hidden from `content`.
        thoughts: Vec<Thought>,
    },
    Complete(TurnSummary),
    Error {
        message: String,
    },
}

impl StreamEvent {
    /// The wire name of this event.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// The JSON payload of this event.
    pub fn payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Complete(_) | StreamEvent::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::ThoughtType;
    use serde_json::json;

    #[test]
    fn names_are_snake_case() {
        assert_eq!(
            StreamEvent::ThinkingStart {
                phase: Phase::Analysis
            }
            .name(),
            "thinking_start"
        );
        assert_eq!(
            StreamEvent::ResponseChunk {
                content: "x".into()
            }
            .name(),
            "response_chunk"
        );
        assert_eq!(
            StreamEvent::Error {
                message: "x".into()
            }
            .name(),
            "error"
        );
    }

    #[test]
    fn thinking_update_flattens_detail() {
        let event = StreamEvent::ThinkingUpdate {
            phase: Phase::SearchDecision,
            thoughts: vec![Thought::new(ThoughtType::SearchDecision, "recency")],
            detail: PhaseDetail::SearchDecision {
                needs_search: true,
                confidence: 0.9,
                reasoning: "recency".into(),
            },
        };
        let payload = event.payload();
        assert_eq!(payload["phase"], "search_decision");
        assert_eq!(payload["needsSearch"], true);
        assert_eq!(payload["thoughts"][0]["type"], "search_decision");
    }

    #[test]
    fn failed_round_carries_error_thought() {
        let event = StreamEvent::SearchResults {
            round: 1,
            query: "rust news".into(),
            results: Vec::new(),
            total_results: 0,
            continue_searching: true,
            reasoning: "Only 0 results so far.".into(),
            error: Some("upstream searxng failed".into()),
            thoughts: vec![Thought::new(ThoughtType::Error, "Search for \"rust news\" failed")],
        };
        let payload = event.payload();
        assert_eq!(payload["totalResults"], 0);
        assert_eq!(payload["error"], "upstream searxng failed");
        assert_eq!(payload["thoughts"][0]["type"], "error");

        let ok = StreamEvent::ResponseComplete {
            content: "4".into(),
            thoughts: Vec::new(),
        };
        assert_eq!(ok.payload(), json!({"content": "4", "thoughts": []}));
    }

    #[test]
    fn complete_payload_is_camel_case() {
        let event = StreamEvent::Complete(TurnSummary {
            used_search: true,
            sources: vec![Source {
                title: "t".into(),
                url: "https://t".into(),
            }],
            source_count: 1,
            thought_count: 3,
            memory_items_added: 0,
            memories_used: 2,
            elapsed_ms: 10,
            queries_used: vec!["q".into()],
            search_rounds: 1,
            session_id: "s".into(),
        });
        let payload = event.payload();
        assert_eq!(payload["usedSearch"], true);
        assert_eq!(payload["sourceCount"], 1);
        assert_eq!(payload["queriesUsed"], json!(["q"]));
        assert_eq!(payload["sessionId"], "s");
        assert!(event.is_terminal());
    }
}
