// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires concrete adapters into a [`Coordinator`].

use std::sync::Arc;

use tracing::{debug, info};

use scout_agent::Coordinator;
use scout_config::ScoutConfig;
use scout_core::{PluginAdapter, ScoutError};
use scout_ollama::OllamaBackend;
use scout_search::{ContentExtractor, SearxngBackend};
use scout_storage::SqliteDocumentStore;

/// Everything a command needs: the coordinator plus the adapters behind it.
pub struct Runtime {
    pub coordinator: Arc<Coordinator>,
    pub adapters: Vec<Arc<dyn PluginAdapter>>,
    docs: Arc<SqliteDocumentStore>,
}

impl Runtime {
    /// Builds Ollama, SearXNG, page extraction, and SQLite adapters from `config`.
    pub async fn build(config: &ScoutConfig) -> Result<Self, ScoutError> {
        let generation = Arc::new(OllamaBackend::from_config(&config.generation)?);
        let search = Arc::new(SearxngBackend::from_config(&config.search)?);
        let fetcher = Arc::new(ContentExtractor::from_config(&config.extraction)?);
        let docs = Arc::new(SqliteDocumentStore::open(&config.storage).await?);
        debug!(path = %config.storage.database_path, "document store opened");

        let coordinator = Arc::new(Coordinator::from_config(
            config,
            generation.clone(),
            search.clone(),
            fetcher,
            docs.clone(),
        ));

        let mut adapters: Vec<Arc<dyn PluginAdapter>> = vec![generation, docs.clone()];
        if config.search.enabled {
            adapters.push(search);
        }

        info!(
            model = %config.generation.model,
            search = config.search.enabled,
            memory = config.memory.enabled,
            "runtime ready"
        );

        Ok(Self {
            coordinator,
            adapters,
            docs,
        })
    }

    /// Checkpoints storage before exit.
    pub async fn close(&self) -> Result<(), ScoutError> {
        self.docs.close().await
    }
}
