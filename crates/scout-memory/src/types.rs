// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source label for memories extracted from a conversation exchange.
pub const CONVERSATION_SOURCE: &str = "conversation";

/// A single stored memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    pub id: u64,
    pub content: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Clamped to [0, 1] on insertion.
    pub importance: f32,
    /// Absent when embedding failed; such items are never retrieved by similarity.
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

/// The persisted memory aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryCollection {
    #[serde(default)]
    pub long_term: Vec<MemoryItem>,
    #[serde(default = "first_id")]
    pub next_id: u64,
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self {
            long_term: Vec::new(),
            next_id: first_id(),
        }
    }
}

fn first_id() -> u64 {
    1
}

/// Content proposed for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryCandidate {
    pub content: String,
    pub tags: BTreeSet<String>,
    pub importance: f32,
    pub source: String,
}

impl MemoryCandidate {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tags: BTreeSet::new(),
            importance: 0.5,
            source: CONVERSATION_SOURCE.to_string(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_importance(mut self, importance: f32) -> Self {
        self.importance = importance;
        self
    }
}

/// A retrieved memory with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMemory {
    #[serde(flatten)]
    pub item: MemoryItem,
    pub similarity: f32,
}
