// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `scout memory` commands.

use std::io::Write;

use scout_core::ScoutError;
use scout_memory::MemoryStore;

fn write_err(e: std::io::Error) -> ScoutError {
    ScoutError::Internal(format!("failed to write output: {e}"))
}

/// Prints the memories most similar to `query`, best first.
pub async fn run_search<W: Write>(
    store: &MemoryStore,
    query: &str,
    k: usize,
    min_similarity: f32,
    out: &mut W,
) -> Result<usize, ScoutError> {
    let found = store.retrieve(query, k, min_similarity).await;
    if found.is_empty() {
        writeln!(out, "no matching memories").map_err(write_err)?;
    }
    for scored in &found {
        writeln!(
            out,
            "[{:.2}] #{} {}",
            scored.similarity, scored.item.id, scored.item.content
        )
        .map_err(write_err)?;
    }
    Ok(found.len())
}

/// Removes every stored memory.
pub async fn run_clear<W: Write>(store: &MemoryStore, out: &mut W) -> Result<(), ScoutError> {
    let count = store.items().await?.len();
    store.clear().await?;
    writeln!(out, "cleared {count} memories").map_err(write_err)
}
