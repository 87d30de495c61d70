// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock search backend and page fetcher.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use scout_core::{HealthStatus, PageFetcher, PluginAdapter, ScoutError, SearchBackend, SearchResult};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A search backend with canned results per query.
#[derive(Default)]
pub struct MockSearch {
    by_query: Mutex<HashMap<String, Vec<SearchResult>>>,
    default_results: Mutex<Vec<SearchResult>>,
    failing: Mutex<HashSet<String>>,
    fail_all: Mutex<bool>,
    queries: Mutex<Vec<String>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Results for exactly `query`.
    pub fn add_results(&self, query: &str, results: Vec<SearchResult>) {
        lock(&self.by_query).insert(query.to_string(), results);
    }

    /// Results for any query without its own entry.
    pub fn set_default_results(&self, results: Vec<SearchResult>) {
        *lock(&self.default_results) = results;
    }

    /// Makes `query` fail with an upstream error.
    pub fn fail_query(&self, query: &str) {
        lock(&self.failing).insert(query.to_string());
    }

    /// Makes every query fail.
    pub fn fail_all(&self, fail: bool) {
        *lock(&self.fail_all) = fail;
    }

    /// Queries received so far, in order.
    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl PluginAdapter for MockSearch {
    fn name(&self) -> &str {
        "mock-search"
    }

    async fn health_check(&self) -> Result<HealthStatus, ScoutError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl SearchBackend for MockSearch {
    async fn search(
        &self,
        query: &str,
        count: usize,
        _timeout: Duration,
    ) -> Result<Vec<SearchResult>, ScoutError> {
        lock(&self.queries).push(query.to_string());
        if *lock(&self.fail_all) || lock(&self.failing).contains(query) {
            return Err(ScoutError::upstream("mock-search", "scripted failure"));
        }
        let results = lock(&self.by_query)
            .get(query)
            .cloned()
            .unwrap_or_else(|| lock(&self.default_results).clone());
        Ok(results.into_iter().take(count).collect())
    }
}

/// A page fetcher serving canned text per URL. Unknown URLs yield "".
#[derive(Default)]
pub struct MockFetcher {
    pages: Mutex<HashMap<String, String>>,
    fetched: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&self, url: &str, text: &str) {
        lock(&self.pages).insert(url.to_string(), text.to_string());
    }

    /// URLs fetched so far.
    pub fn fetched(&self) -> Vec<String> {
        lock(&self.fetched).clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_and_clean(&self, url: &str, _timeout: Duration, max_chars: usize) -> String {
        lock(&self.fetched).push(url.to_string());
        lock(&self.pages)
            .get(url)
            .map(|text| text.chars().take(max_chars).collect())
            .unwrap_or_default()
    }
}
