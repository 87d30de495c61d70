// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Scout.
//!
//! Holds the error model, the domain types shared by every phase of a
//! conversational turn, and the adapter traits behind which the generation
//! backend, search backend, page fetcher, and document store live. All
//! concrete adapters implement traits defined here.

pub mod error;
pub mod timeout;
pub mod traits;
pub mod types;

pub use error::ScoutError;
pub use timeout::with_timeout;
pub use types::{
    ChatChunk, ChatMessage, ChatRequest, ChunkStream, Complexity, CompletionRequest,
    EmbeddingOutput, EmbeddingRequest, HealthStatus, Role, SearchResult, Thought, ThoughtType,
    VersionedDocument,
};

pub use traits::{DocumentStore, GenerationBackend, PageFetcher, PluginAdapter, SearchBackend};
