// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Scout.
//!
//! - [`MockBackend`] - scripted generation backend with bag-of-words embeddings
//! - [`MockSearch`] / [`MockFetcher`] - canned search results and page text
//! - [`TestHarness`] - a full coordinator over the mocks and a temp database

pub mod harness;
pub mod mock_backend;
pub mod mock_search;

pub use harness::{TestHarness, event_names};
pub use mock_backend::{MOCK_DIMENSIONS, MockBackend, mock_embedding};
pub use mock_search::{MockFetcher, MockSearch};
