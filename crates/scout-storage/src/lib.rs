// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for Scout.
//!
//! Stores versioned JSON documents keyed by string. All access is serialized
//! through tokio-rusqlite's single background thread, and every write is a
//! compare-and-swap against the version the caller last read.

pub mod database;
pub mod documents;

pub use database::{Database, map_tr_err};
pub use documents::SqliteDocumentStore;
