// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extraction of durable facts from a finished exchange.

use std::sync::Arc;
use std::time::Duration;

use scout_core::{CompletionRequest, GenerationBackend, ScoutError};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::types::{CONVERSATION_SOURCE, MemoryCandidate};

const EXTRACTION_PROMPT: &str = r#"Extract facts from this exchange that are worth remembering in future conversations. Output a JSON array.

For each fact:
- "content": the fact as a standalone statement (e.g. "The user is planning a trip to Paris")
- "tags": a few short lowercase topic tags
- "importance": a number from 0.0 to 1.0

Only include facts that are specific, durable, and likely to matter later. Do not include the question itself or generic knowledge.
If there is nothing worth remembering, return [].

User: {user}
Assistant: {assistant}

Output the JSON array only:"#;

#[derive(Debug, Deserialize)]
struct ExtractedFact {
    content: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default = "default_importance")]
    importance: f32,
}

fn default_importance() -> f32 {
    0.5
}

/// Asks the generation backend for memory candidates.
pub struct MemoryExtractor {
    backend: Arc<dyn GenerationBackend>,
    model: String,
    timeout: Duration,
    max_items: usize,
}

impl MemoryExtractor {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        model: String,
        timeout: Duration,
        max_items: usize,
    ) -> Self {
        Self {
            backend,
            model,
            timeout,
            max_items,
        }
    }

    /// Extracts at most `max_items` candidates from one exchange.
    ///
    /// Backend failures are returned; malformed output yields no candidates.
    pub async fn extract(
        &self,
        user_message: &str,
        answer: &str,
    ) -> Result<Vec<MemoryCandidate>, ScoutError> {
        let prompt = EXTRACTION_PROMPT
            .replace("{user}", user_message)
            .replace("{assistant}", answer);

        let response = self
            .backend
            .complete(CompletionRequest {
                model: self.model.clone(),
                prompt,
                system: None,
                temperature: Some(0.0),
                timeout: self.timeout,
            })
            .await?;

        let mut candidates = parse_extraction_response(&response);
        candidates.truncate(self.max_items);
        debug!(count = candidates.len(), "memory candidates extracted");
        Ok(candidates)
    }
}

/// Parses the backend's extraction reply into candidates.
///
/// Tolerates markdown fences and surrounding prose. Returns an empty Vec when
/// no JSON array can be parsed.
pub fn parse_extraction_response(response: &str) -> Vec<MemoryCandidate> {
    let trimmed = response.trim();
    let (Some(start), Some(end)) = (trimmed.find('['), trimmed.rfind(']')) else {
        debug!("extraction response has no JSON array");
        return Vec::new();
    };
    if end < start {
        return Vec::new();
    }

    match serde_json::from_str::<Vec<ExtractedFact>>(&trimmed[start..=end]) {
        Ok(facts) => facts
            .into_iter()
            .filter(|f| !f.content.trim().is_empty())
            .map(|f| MemoryCandidate {
                content: f.content.trim().to_string(),
                tags: f
                    .tags
                    .into_iter()
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect(),
                importance: if f.importance.is_finite() {
                    f.importance.clamp(0.0, 1.0)
                } else {
                    default_importance()
                },
                source: CONVERSATION_SOURCE.to_string(),
            })
            .collect(),
        Err(e) => {
            warn!("failed to parse extraction response: {e}");
            debug!("raw response: {response}");
            Vec::new()
        }
    }
}
