// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query planning, search execution, and content enrichment.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use scout_config::model::{ExtractionConfig, GenerationConfig, SearchConfig};
use scout_core::{
    CompletionRequest, GenerationBackend, PageFetcher, ScoutError, SearchBackend, SearchResult,
    Thought, ThoughtType,
};
use scout_decision::extract_thoughts;

use crate::query::{normalize_url, parse_query_list};

const QUERY_PROMPT: &str = r#"Write up to {max} short web search queries that together would find the information needed to answer this question. Vary the wording and angle of each query.

Question: {query}

Return only a numbered list, one query per line."#;

/// Knobs for one orchestrator, taken from the `[search]` and `[extraction]`
/// config sections.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub model: String,
    pub generation_timeout: Duration,
    pub results_per_query: usize,
    pub search_timeout: Duration,
    pub max_pages: usize,
    pub fetch_timeout: Duration,
    pub max_chars: usize,
    pub min_content_length: usize,
}

impl SearchSettings {
    pub fn from_config(
        generation: &GenerationConfig,
        search: &SearchConfig,
        extraction: &ExtractionConfig,
    ) -> Self {
        Self {
            model: generation.model.clone(),
            generation_timeout: generation.request_timeout(),
            results_per_query: search.results_per_query,
            search_timeout: search.timeout(),
            max_pages: search.max_pages_to_fetch,
            fetch_timeout: extraction.fetch_timeout(),
            max_chars: extraction.max_bytes,
            min_content_length: extraction.min_content_length,
        }
    }
}

/// A planned list of search queries. Never empty.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub queries: Vec<String>,
    pub thoughts: Vec<Thought>,
    /// Set when the backend failed and the plan fell back to the user query.
    pub error: Option<String>,
}

/// Results of running several queries back to back.
#[derive(Debug, Clone, Default)]
pub struct SearchBatch {
    pub results: Vec<SearchResult>,
    pub total_before_dedup: usize,
    pub failed_queries: Vec<String>,
}

/// Collects results across rounds, keeping the first occurrence of each URL.
#[derive(Debug, Default)]
pub struct SearchAccumulator {
    seen: HashSet<String>,
    results: Vec<SearchResult>,
    total_before_dedup: usize,
}

impl SearchAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a round's results and returns the ones not seen before.
    pub fn add(&mut self, results: Vec<SearchResult>) -> Vec<SearchResult> {
        self.total_before_dedup += results.len();
        let mut fresh = Vec::new();
        for result in results {
            if self.seen.insert(normalize_url(&result.url)) {
                fresh.push(result.clone());
                self.results.push(result);
            }
        }
        fresh
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn total_before_dedup(&self) -> usize {
        self.total_before_dedup
    }

    pub fn into_results(self) -> Vec<SearchResult> {
        self.results
    }
}

/// Plans, runs, and enriches web searches for one turn.
#[derive(Clone)]
pub struct SearchOrchestrator {
    generation: Arc<dyn GenerationBackend>,
    search: Arc<dyn SearchBackend>,
    fetcher: Arc<dyn PageFetcher>,
    settings: SearchSettings,
}

impl SearchOrchestrator {
    pub fn new(
        generation: Arc<dyn GenerationBackend>,
        search: Arc<dyn SearchBackend>,
        fetcher: Arc<dyn PageFetcher>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            generation,
            search,
            fetcher,
            settings,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Asks the backend for up to `max_queries` query variants.
    ///
    /// Falls back to the user query itself when the backend fails or its
    /// reply holds no list items.
    pub async fn generate_queries(&self, user_query: &str, max_queries: usize) -> QueryPlan {
        let max_queries = max_queries.max(1);
        let fallback = vec![user_query.trim().to_string()];
        let prompt = QUERY_PROMPT
            .replace("{max}", &max_queries.to_string())
            .replace("{query}", user_query);

        let reply = self
            .generation
            .complete(CompletionRequest {
                model: self.settings.model.clone(),
                prompt,
                system: None,
                temperature: Some(0.3),
                timeout: self.settings.generation_timeout,
            })
            .await;

        match reply {
            Ok(text) => {
                let split = extract_thoughts(&text);
                let mut seen = HashSet::new();
                let queries: Vec<String> = parse_query_list(&split.cleaned)
                    .into_iter()
                    .filter(|q| seen.insert(q.to_lowercase()))
                    .take(max_queries)
                    .collect();
                let thoughts = split
                    .thoughts
                    .into_iter()
                    .map(|t| Thought::new(ThoughtType::Reasoning, t))
                    .collect();
                if queries.is_empty() {
                    debug!("no list items in query plan, using the question itself");
                }
                QueryPlan {
                    queries: if queries.is_empty() { fallback } else { queries },
                    thoughts,
                    error: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "query planning failed, searching for the question itself");
                QueryPlan {
                    queries: fallback,
                    thoughts: vec![Thought::new(
                        ThoughtType::Error,
                        format!("Query planning failed: {e}"),
                    )],
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Runs a single query against the search backend.
    pub async fn run_query(&self, query: &str) -> Result<Vec<SearchResult>, ScoutError> {
        self.search
            .search(
                query,
                self.settings.results_per_query,
                self.settings.search_timeout,
            )
            .await
    }

    /// Runs every query in order, keeping partial results when some fail.
    pub async fn execute_searches(&self, queries: &[String]) -> SearchBatch {
        let mut accumulator = SearchAccumulator::new();
        let mut failed_queries = Vec::new();

        for query in queries {
            match self.run_query(query).await {
                Ok(results) => {
                    accumulator.add(results);
                }
                Err(e) => {
                    warn!(query = %query, error = %e, "search query failed");
                    failed_queries.push(query.clone());
                }
            }
        }

        SearchBatch {
            total_before_dedup: accumulator.total_before_dedup(),
            results: accumulator.into_results(),
            failed_queries,
        }
    }

    /// Fetches the top results concurrently and attaches their cleaned text.
    ///
    /// Pages that fail or yield less than the minimum content length are left
    /// without content. Result order is preserved.
    pub async fn process_content(&self, mut results: Vec<SearchResult>) -> Vec<SearchResult> {
        let take = self.settings.max_pages.min(results.len());
        let fetches = results[..take].iter().map(|r| {
            self.fetcher.fetch_and_clean(
                &r.url,
                self.settings.fetch_timeout,
                self.settings.max_chars,
            )
        });
        let pages = join_all(fetches).await;

        for (result, text) in results.iter_mut().zip(pages) {
            if text.chars().count() >= self.settings.min_content_length {
                result.extracted_content = Some(text);
            } else {
                debug!(url = %result.url, "dropping page with too little content");
            }
        }
        results
    }
}
