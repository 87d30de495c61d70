// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end turns.
//!
//! `TestHarness` wires a full [`Coordinator`] from the default configuration
//! with mock adapters and a temporary SQLite database, and collects the
//! events of a turn into a `Vec`.

use std::sync::Arc;

use scout_agent::{Coordinator, StreamEvent, TurnRequest};
use scout_config::ScoutConfig;
use scout_core::{ScoutError, SearchResult};
use scout_storage::SqliteDocumentStore;

use crate::mock_backend::MockBackend;
use crate::mock_search::{MockFetcher, MockSearch};

/// Builder for a [`TestHarness`].
pub struct TestHarnessBuilder {
    config: ScoutConfig,
    search_results: Vec<SearchResult>,
    pages: Vec<(String, String)>,
    rules: Vec<(String, String)>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: ScoutConfig::default(),
            search_results: Vec::new(),
            pages: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Adjusts the configuration before the coordinator is built.
    pub fn with_config(mut self, adjust: impl FnOnce(&mut ScoutConfig)) -> Self {
        adjust(&mut self.config);
        self
    }

    /// Results returned for every search query.
    pub fn with_search_results(mut self, results: Vec<SearchResult>) -> Self {
        self.search_results = results;
        self
    }

    /// Page text served for `url`.
    pub fn with_page(mut self, url: &str, text: &str) -> Self {
        self.pages.push((url.to_string(), text.to_string()));
        self
    }

    /// Scripts a backend reply for prompts containing `pattern`.
    pub fn respond_when(mut self, pattern: &str, response: &str) -> Self {
        self.rules.push((pattern.to_string(), response.to_string()));
        self
    }

    pub async fn build(mut self) -> Result<TestHarness, ScoutError> {
        let temp_dir = tempfile::TempDir::new().map_err(ScoutError::storage)?;
        self.config.storage.database_path =
            temp_dir.path().join("scout.db").to_string_lossy().to_string();
        let docs = Arc::new(SqliteDocumentStore::open(&self.config.storage).await?);

        let backend = Arc::new(MockBackend::new());
        for (pattern, response) in &self.rules {
            backend.respond_when(pattern, response);
        }
        let search = Arc::new(MockSearch::new());
        search.set_default_results(self.search_results);
        let fetcher = Arc::new(MockFetcher::new());
        for (url, text) in &self.pages {
            fetcher.add_page(url, text);
        }

        let coordinator = Arc::new(Coordinator::from_config(
            &self.config,
            backend.clone(),
            search.clone(),
            fetcher.clone(),
            docs.clone(),
        ));

        Ok(TestHarness {
            backend,
            search,
            fetcher,
            docs,
            coordinator,
            config: self.config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete turn pipeline over mock backends and temp storage.
pub struct TestHarness {
    pub backend: Arc<MockBackend>,
    pub search: Arc<MockSearch>,
    pub fetcher: Arc<MockFetcher>,
    pub docs: Arc<SqliteDocumentStore>,
    pub coordinator: Arc<Coordinator>,
    pub config: ScoutConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Runs `request` to completion and returns every event it emitted.
    pub async fn run(&self, request: TurnRequest) -> Result<Vec<StreamEvent>, ScoutError> {
        let mut handle = self
            .coordinator
            .start(request, self.config.gateway.event_buffer)?;
        let mut events = Vec::new();
        while let Some(event) = handle.next_event().await {
            events.push(event);
        }
        Ok(events)
    }

    /// Runs a turn for `message` with default options.
    pub async fn ask(&self, message: &str) -> Result<Vec<StreamEvent>, ScoutError> {
        self.run(TurnRequest::new(message)).await
    }
}

/// Names of `events`, in order.
pub fn event_names(events: &[StreamEvent]) -> Vec<&'static str> {
    events.iter().map(StreamEvent::name).collect()
}
