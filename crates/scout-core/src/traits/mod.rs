// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits for Scout's pluggable backends.

pub mod adapter;
pub mod generation;
pub mod search;
pub mod storage;

pub use adapter::PluginAdapter;
pub use generation::GenerationBackend;
pub use search::{PageFetcher, SearchBackend};
pub use storage::DocumentStore;
