// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Versioned memory store with similarity retrieval and deduplicating upsert.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;
use scout_core::{DocumentStore, ScoutError};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::embedder::Embedder;
use crate::similarity::cosine_similarity;
use crate::types::{MemoryCandidate, MemoryCollection, MemoryItem, ScoredMemory};

/// Document key holding the memory collection.
pub const MEMORY_KEY: &str = "memory";

/// Default similarity above which a candidate counts as a duplicate.
pub const DEFAULT_DUPLICATE_THRESHOLD: f32 = 0.95;

/// Compare-and-swap attempts before giving up on a contended write.
const MAX_WRITE_ATTEMPTS: usize = 3;

/// Persistent long-term memory.
///
/// Read-modify-write cycles are serialized by an in-process mutex, and every
/// write is a compare-and-swap on the document version so writers in other
/// processes cannot silently overwrite each other.
pub struct MemoryStore {
    docs: Arc<dyn DocumentStore>,
    embedder: Embedder,
    duplicate_threshold: f32,
    write_lock: Mutex<()>,
}

impl MemoryStore {
    pub fn new(docs: Arc<dyn DocumentStore>, embedder: Embedder) -> Self {
        Self {
            docs,
            embedder,
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_duplicate_threshold(mut self, threshold: f32) -> Self {
        self.duplicate_threshold = threshold;
        self
    }

    async fn load(&self) -> Result<(MemoryCollection, Option<u64>), ScoutError> {
        match self.docs.get(MEMORY_KEY).await? {
            Some(doc) => {
                let collection = serde_json::from_value(doc.value)
                    .map_err(|e| ScoutError::Parse(format!("corrupt memory document: {e}")))?;
                Ok((collection, Some(doc.version)))
            }
            None => Ok((MemoryCollection::default(), None)),
        }
    }

    async fn save(
        &self,
        collection: &MemoryCollection,
        expected_version: Option<u64>,
    ) -> Result<u64, ScoutError> {
        let value = serde_json::to_value(collection)
            .map_err(|e| ScoutError::Internal(format!("failed to encode memory: {e}")))?;
        self.docs.put(MEMORY_KEY, value, expected_version).await
    }

    /// All stored memories in insertion order.
    pub async fn items(&self) -> Result<Vec<MemoryItem>, ScoutError> {
        Ok(self.load().await?.0.long_term)
    }

    /// Returns up to `k` memories with similarity at least `min_similarity`,
    /// most similar first. Ties keep insertion order.
    ///
    /// Never fails: storage or embedding problems yield an empty result.
    pub async fn retrieve(&self, query: &str, k: usize, min_similarity: f32) -> Vec<ScoredMemory> {
        if k == 0 || query.trim().is_empty() {
            return Vec::new();
        }

        let collection = match self.load().await {
            Ok((collection, _)) => collection,
            Err(e) => {
                warn!(error = %e, "memory load failed, skipping retrieval");
                return Vec::new();
            }
        };
        if !collection.long_term.iter().any(|m| m.embedding.is_some()) {
            return Vec::new();
        }

        let query_embedding = match self.embedder.embed_one(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(error = %e, "query embedding failed, skipping retrieval");
                return Vec::new();
            }
        };

        let mut scored: Vec<ScoredMemory> = collection
            .long_term
            .into_iter()
            .filter_map(|item| {
                let similarity = cosine_similarity(&query_embedding, item.embedding.as_deref()?)?;
                (similarity >= min_similarity).then_some(ScoredMemory { item, similarity })
            })
            .collect();

        // sort_by is stable, so equal scores stay in insertion order.
        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        scored.truncate(k);

        debug!(count = scored.len(), "memories retrieved");
        scored
    }

    /// Inserts candidates that are not near-duplicates of stored memories or
    /// of earlier candidates in the same batch. Returns the inserted items.
    ///
    /// Embedding is best-effort: if it fails the candidates are still stored,
    /// without embeddings, and cannot be retrieved by similarity.
    pub async fn upsert(
        &self,
        candidates: Vec<MemoryCandidate>,
    ) -> Result<Vec<MemoryItem>, ScoutError> {
        let candidates: Vec<MemoryCandidate> = candidates
            .into_iter()
            .filter(|c| !c.content.trim().is_empty())
            .collect();
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self.embed_candidates(&candidates).await;

        let _guard = self.write_lock.lock().await;
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let (mut collection, version) = self.load().await?;
            let inserted = self.merge(&mut collection, &candidates, &embeddings);
            if inserted.is_empty() {
                return Ok(inserted);
            }

            match self.save(&collection, version).await {
                Ok(_) => {
                    info!(count = inserted.len(), "memories stored");
                    return Ok(inserted);
                }
                Err(ScoutError::VersionConflict { .. }) if attempt < MAX_WRITE_ATTEMPTS => {
                    debug!(attempt, "memory document changed underneath us, reloading");
                }
                Err(e) => return Err(e),
            }
        }

        Err(ScoutError::Internal(
            "memory write loop exited without result".into(),
        ))
    }

    async fn embed_candidates(&self, candidates: &[MemoryCandidate]) -> Vec<Option<Vec<f32>>> {
        let texts = candidates.iter().map(|c| c.content.clone()).collect();
        match self.embedder.embed(texts).await {
            Ok(vectors) => vectors.into_iter().map(Some).collect(),
            Err(e) => {
                warn!(error = %e, "memory embedding failed, storing without embeddings");
                vec![None; candidates.len()]
            }
        }
    }

    /// Appends non-duplicate candidates to `collection`, assigning ids.
    fn merge(
        &self,
        collection: &mut MemoryCollection,
        candidates: &[MemoryCandidate],
        embeddings: &[Option<Vec<f32>>],
    ) -> Vec<MemoryItem> {
        let mut inserted = Vec::new();

        for (candidate, embedding) in candidates.iter().zip(embeddings) {
            if let Some(vector) = embedding {
                let duplicate = collection.long_term.iter().find_map(|existing| {
                    let sim = cosine_similarity(vector, existing.embedding.as_deref()?)?;
                    (sim > self.duplicate_threshold).then_some((existing.id, sim))
                });
                if let Some((id, sim)) = duplicate {
                    debug!(duplicate_of = id, similarity = sim, "skipping duplicate memory");
                    continue;
                }
            }

            let item = MemoryItem {
                id: collection.next_id,
                content: candidate.content.trim().to_string(),
                tags: candidate.tags.clone(),
                importance: candidate.importance.clamp(0.0, 1.0),
                embedding: embedding.clone(),
                timestamp: Utc::now(),
                source: candidate.source.clone(),
            };
            collection.next_id += 1;
            collection.long_term.push(item.clone());
            inserted.push(item);
        }

        inserted
    }

    /// Removes one memory by id. `nextId` is left untouched.
    pub async fn remove(&self, id: u64) -> Result<bool, ScoutError> {
        let _guard = self.write_lock.lock().await;
        let (mut collection, version) = self.load().await?;
        let before = collection.long_term.len();
        collection.long_term.retain(|m| m.id != id);
        if collection.long_term.len() == before {
            return Ok(false);
        }
        self.save(&collection, version).await?;
        Ok(true)
    }

    /// Empties the collection and resets `nextId` to 1.
    pub async fn clear(&self) -> Result<(), ScoutError> {
        let _guard = self.write_lock.lock().await;
        let (_, version) = self.load().await?;
        self.save(&MemoryCollection::default(), version).await?;
        info!("memory cleared");
        Ok(())
    }
}
