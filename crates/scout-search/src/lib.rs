// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Web search for Scout.
//!
//! - [`ContentExtractor`] fetches a page and reduces it to readable text.
//! - [`SearxngBackend`] queries a SearXNG instance over its JSON API.
//! - [`SearchOrchestrator`] plans query variants, runs them, deduplicates
//!   results by URL, and enriches the best hits with page content.

pub mod extractor;
pub mod orchestrator;
pub mod query;
pub mod searxng;

pub use extractor::{ContentExtractor, clean_html};
pub use orchestrator::{
    QueryPlan, SearchAccumulator, SearchBatch, SearchOrchestrator, SearchSettings,
};
pub use query::{ContinueDecision, normalize_url, parse_query_list, should_continue_searching};
pub use searxng::SearxngBackend;
