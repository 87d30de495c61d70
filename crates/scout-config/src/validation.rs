// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::ScoutConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &ScoutConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let mut non_empty = |key: &str, value: &str| {
        if value.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("{key} must not be empty"),
            });
        }
    };
    non_empty("generation.model", &config.generation.model);
    non_empty("generation.embedding_model", &config.generation.embedding_model);
    non_empty("generation.base_url", &config.generation.base_url);
    non_empty("search.base_url", &config.search.base_url);
    non_empty("storage.database_path", &config.storage.database_path);
    non_empty("gateway.host", &config.gateway.host);

    for (key, url) in [
        ("generation.base_url", &config.generation.base_url),
        ("search.base_url", &config.search.base_url),
    ] {
        let trimmed = url.trim();
        if !trimmed.is_empty()
            && !(trimmed.starts_with("http://") || trimmed.starts_with("https://"))
        {
            errors.push(ConfigError::Validation {
                message: format!("{key} `{trimmed}` must start with http:// or https://"),
            });
        }
    }

    for (key, value) in [
        ("memory.min_similarity", config.memory.min_similarity),
        ("memory.duplicate_threshold", config.memory.duplicate_threshold),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be between 0.0 and 1.0, got {value}"),
            });
        }
    }

    for (key, value) in [
        ("search.max_queries", config.search.max_queries),
        ("search.max_rounds", config.search.max_rounds),
        ("search.results_per_query", config.search.results_per_query),
        ("extraction.max_bytes", config.extraction.max_bytes),
        ("gateway.event_buffer", config.gateway.event_buffer),
    ] {
        if value == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be at least 1"),
            });
        }
    }

    for (key, secs) in [
        ("generation.request_timeout_secs", config.generation.request_timeout_secs),
        (
            "generation.stream_idle_timeout_secs",
            config.generation.stream_idle_timeout_secs,
        ),
        (
            "generation.embedding_timeout_secs",
            config.generation.embedding_timeout_secs,
        ),
        ("search.timeout_secs", config.search.timeout_secs),
        ("extraction.fetch_timeout_secs", config.extraction.fetch_timeout_secs),
    ] {
        if secs == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be at least 1 second"),
            });
        }
    }

    if !(0.0..=2.0).contains(&config.generation.temperature) {
        errors.push(ConfigError::Validation {
            message: format!(
                "generation.temperature must be between 0.0 and 2.0, got {}",
                config.generation.temperature
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
