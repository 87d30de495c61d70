// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama backend for Scout.
//!
//! Implements [`scout_core::GenerationBackend`] over the Ollama HTTP API:
//! `/api/chat` (buffered and NDJSON-streamed), `/api/generate`, and
//! `/api/embed` with a fallback to the legacy `/api/embeddings` endpoint.

pub mod client;
pub mod stream;
pub mod types;

pub use client::OllamaBackend;
