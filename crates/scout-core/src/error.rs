// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Scout.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across all Scout adapters and pipeline phases.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Configuration errors (invalid TOML, bad values, missing settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// Document store errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A backend (generation, embedding, search, web page) was unreachable or
    /// answered with a non-success status.
    #[error("{service} unavailable: {message}")]
    Upstream {
        service: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A bounded operation exceeded its deadline.
    #[error("{operation} timed out after {duration:?}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// Backend text could not be parsed into the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// The embedding operation returned nothing usable.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// A compare-and-swap write lost against a concurrent writer.
    #[error("version conflict on `{key}`: expected {expected:?}, found {found:?}")]
    VersionConflict {
        key: String,
        expected: Option<u64>,
        found: Option<u64>,
    },

    /// A caller-supplied request was rejected before any work started.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ScoutError {
    /// Shorthand for an upstream failure without an underlying source.
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        ScoutError::Upstream {
            service: service.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Wraps any error as a storage failure.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        ScoutError::Storage {
            source: Box::new(err),
        }
    }

    /// True for failures a phase absorbs by falling back to a degraded path.
    ///
    /// Configuration and internal errors indicate a broken deployment rather
    /// than a flaky dependency.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ScoutError::Upstream { .. }
                | ScoutError::Timeout { .. }
                | ScoutError::Parse(_)
                | ScoutError::Embedding(_)
                | ScoutError::VersionConflict { .. }
                | ScoutError::Storage { .. }
        )
    }

    /// True for timeouts, which the pipeline treats exactly like an
    /// unavailable upstream.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScoutError::Timeout { .. })
    }
}
