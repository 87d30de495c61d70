// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Scout.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Scout configuration.
///
/// Every section is optional and defaults to values suitable for a local
/// Ollama plus SearXNG deployment.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScoutConfig {
    /// Assistant identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Generation and embedding backend.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Web search behavior.
    #[serde(default)]
    pub search: SearchConfig,

    /// Page fetching and text extraction.
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Long-term memory.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Document store.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Session transcripts.
    #[serde(default)]
    pub session: SessionConfig,

    /// HTTP gateway.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Assistant identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Overrides the built-in answer system prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
        }
    }
}

fn default_agent_name() -> String {
    "scout".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Generation backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Base URL of the Ollama-compatible API.
    #[serde(default = "default_generation_url")]
    pub base_url: String,

    /// Model used for chat, completion, and answer generation.
    #[serde(default = "default_model")]
    pub model: String,

    /// Model used for embeddings.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Deadline for buffered chat and completion calls.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum silence between streamed answer chunks.
    #[serde(default = "default_stream_idle_timeout_secs")]
    pub stream_idle_timeout_secs: u64,

    /// Deadline for embedding calls.
    #[serde(default = "default_embedding_timeout_secs")]
    pub embedding_timeout_secs: u64,

    /// Sampling temperature for the answer call.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_url(),
            model: default_model(),
            embedding_model: default_embedding_model(),
            request_timeout_secs: default_request_timeout_secs(),
            stream_idle_timeout_secs: default_stream_idle_timeout_secs(),
            embedding_timeout_secs: default_embedding_timeout_secs(),
            temperature: default_temperature(),
        }
    }
}

impl GenerationConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn stream_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_idle_timeout_secs)
    }

    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding_timeout_secs)
    }
}

fn default_generation_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "qwen3:8b".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_stream_idle_timeout_secs() -> u64 {
    30
}

fn default_embedding_timeout_secs() -> u64 {
    15
}

fn default_temperature() -> f32 {
    0.7
}

/// Web search configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Master switch; when false no turn ever searches.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL of the SearXNG instance.
    #[serde(default = "default_search_url")]
    pub base_url: String,

    /// Maximum query variants generated per turn.
    #[serde(default = "default_max_queries")]
    pub max_queries: usize,

    /// Maximum search rounds per turn.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,

    /// Results requested per query.
    #[serde(default = "default_results_per_query")]
    pub results_per_query: usize,

    /// Deadline for each search call.
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum result pages fetched during content processing.
    #[serde(default = "default_max_pages_to_fetch")]
    pub max_pages_to_fetch: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_search_url(),
            max_queries: default_max_queries(),
            max_rounds: default_max_rounds(),
            results_per_query: default_results_per_query(),
            timeout_secs: default_search_timeout_secs(),
            max_pages_to_fetch: default_max_pages_to_fetch(),
        }
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_true() -> bool {
    true
}

fn default_search_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_max_queries() -> usize {
    3
}

fn default_max_rounds() -> usize {
    3
}

fn default_results_per_query() -> usize {
    5
}

fn default_search_timeout_secs() -> u64 {
    10
}

fn default_max_pages_to_fetch() -> usize {
    4
}

/// Page fetching and text extraction configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionConfig {
    /// Deadline for each page fetch.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Maximum characters of cleaned text kept per page.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Pages whose cleaned text is shorter than this are dropped.
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,

    /// User-Agent header sent with page fetches.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_bytes: default_max_bytes(),
            min_content_length: default_min_content_length(),
            user_agent: default_user_agent(),
        }
    }
}

impl ExtractionConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn default_fetch_timeout_secs() -> u64 {
    8
}

fn default_max_bytes() -> usize {
    5000
}

fn default_min_content_length() -> usize {
    100
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; Scout/0.1; +https://github.com/scout-rs/scout)".to_string()
}

/// Long-term memory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Master switch for retrieval and extraction.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum memories injected into the answer prompt.
    #[serde(default = "default_retrieval_k")]
    pub retrieval_k: usize,

    /// Minimum cosine similarity for a memory to be retrieved.
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,

    /// Candidates more similar than this to an existing memory are skipped.
    #[serde(default = "default_duplicate_threshold")]
    pub duplicate_threshold: f32,

    /// Maximum memory candidates extracted per exchange.
    #[serde(default = "default_max_extracted_items")]
    pub max_extracted_items: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retrieval_k: default_retrieval_k(),
            min_similarity: default_min_similarity(),
            duplicate_threshold: default_duplicate_threshold(),
            max_extracted_items: default_max_extracted_items(),
        }
    }
}

fn default_retrieval_k() -> usize {
    5
}

fn default_min_similarity() -> f32 {
    0.3
}

fn default_duplicate_threshold() -> f32 {
    0.95
}

fn default_max_extracted_items() -> usize {
    5
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("scout").join("scout.db"))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "scout.db".to_string())
}

/// Session transcript configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Prior turns replayed into the answer prompt.
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_turns: default_history_turns(),
        }
    }
}

fn default_history_turns() -> usize {
    6
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Bind host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Capacity of the per-request event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            event_buffer: default_event_buffer(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_event_buffer() -> usize {
    64
}
