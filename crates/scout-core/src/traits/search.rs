// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Web search and page fetching traits.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScoutError;
use crate::traits::adapter::PluginAdapter;
use crate::types::SearchResult;

/// A web search engine.
#[async_trait]
pub trait SearchBackend: PluginAdapter {
    /// Returns up to `count` results for `query`.
    async fn search(
        &self,
        query: &str,
        count: usize,
        timeout: Duration,
    ) -> Result<Vec<SearchResult>, ScoutError>;
}

/// Fetches a web page and reduces it to readable text.
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    /// Returns at most `max_chars` characters of cleaned text.
    ///
    /// Never fails: timeouts, non-success statuses, non-HTML bodies, and
    /// parse problems all produce an empty string.
    async fn fetch_and_clean(&self, url: &str, timeout: Duration, max_chars: usize) -> String;
}
