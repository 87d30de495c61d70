// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding helper bound to a model and deadline.

use std::sync::Arc;
use std::time::Duration;

use scout_config::model::GenerationConfig;
use scout_core::{EmbeddingRequest, GenerationBackend, ScoutError};

/// Embeds text through the generation backend's embedding operation.
#[derive(Clone)]
pub struct Embedder {
    backend: Arc<dyn GenerationBackend>,
    model: String,
    timeout: Duration,
}

impl Embedder {
    pub fn new(backend: Arc<dyn GenerationBackend>, model: String, timeout: Duration) -> Self {
        Self {
            backend,
            model,
            timeout,
        }
    }

    pub fn from_config(backend: Arc<dyn GenerationBackend>, config: &GenerationConfig) -> Self {
        Self::new(
            backend,
            config.embedding_model.clone(),
            config.embedding_timeout(),
        )
    }

    /// Embeds a batch, one vector per input in order.
    pub async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, ScoutError> {
        let expected = texts.len();
        let output = self
            .backend
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                inputs: texts,
                timeout: self.timeout,
            })
            .await?;

        if output.embeddings.len() != expected {
            return Err(ScoutError::Embedding(format!(
                "expected {expected} embeddings, got {}",
                output.embeddings.len()
            )));
        }
        Ok(output.embeddings)
    }

    /// Embeds a single text.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>, ScoutError> {
        self.embed(vec![text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| ScoutError::Embedding("embedding returned no results".into()))
    }
}
