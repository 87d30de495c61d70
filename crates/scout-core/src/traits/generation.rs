// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation backend trait: chat, streaming chat, completion, and embeddings.

use async_trait::async_trait;

use crate::error::ScoutError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    ChatMessage, ChatRequest, ChunkStream, CompletionRequest, EmbeddingOutput, EmbeddingRequest,
};

/// A language-model backend.
///
/// Every call is bounded by the timeout carried in its request. Streaming
/// calls apply that timeout between consecutive chunks rather than to the
/// whole response.
#[async_trait]
pub trait GenerationBackend: PluginAdapter {
    /// Sends a chat exchange and returns the assistant message.
    async fn chat(&self, request: ChatRequest) -> Result<ChatMessage, ScoutError>;

    /// Sends a chat exchange and returns the reply as incremental chunks.
    async fn chat_stream(&self, request: ChatRequest) -> Result<ChunkStream, ScoutError>;

    /// Single-prompt text completion.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ScoutError>;

    /// Embeds a batch of texts.
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingOutput, ScoutError>;
}
