// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Versioned key/value document storage.

use async_trait::async_trait;

use crate::error::ScoutError;
use crate::types::VersionedDocument;

/// A key/value store of JSON documents with optimistic concurrency.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Reads a document, or `None` when the key has never been written.
    async fn get(&self, key: &str) -> Result<Option<VersionedDocument>, ScoutError>;

    /// Writes a document and returns its new version.
    ///
    /// `expected_version` of `None` means the key must not exist yet;
    /// `Some(v)` means the stored version must equal `v`. Any mismatch fails
    /// with [`ScoutError::VersionConflict`] and leaves the stored value intact.
    async fn put(
        &self,
        key: &str,
        value: serde_json::Value,
        expected_version: Option<u64>,
    ) -> Result<u64, ScoutError>;

    /// Removes a document. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, ScoutError>;

    /// Lists keys beginning with `prefix`, sorted ascending.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, ScoutError>;
}
