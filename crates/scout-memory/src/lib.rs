// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term memory for Scout.
//!
//! Memories live in a single versioned document (`{longTerm, nextId}`) in a
//! [`scout_core::DocumentStore`]. Retrieval ranks stored items by cosine
//! similarity against an embedded query; insertion suppresses near-duplicates.

pub mod embedder;
pub mod extractor;
pub mod similarity;
pub mod store;
pub mod types;

pub use embedder::Embedder;
pub use extractor::{MemoryExtractor, parse_extraction_response};
pub use similarity::cosine_similarity;
pub use store::MemoryStore;
pub use types::{MemoryCandidate, MemoryCollection, MemoryItem, ScoredMemory};
