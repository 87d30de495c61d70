// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cosine similarity between embedding vectors.

/// Added to the norm product so zero vectors score 0 instead of NaN.
pub const SIMILARITY_EPSILON: f32 = 1e-8;

/// Computes `dot(a, b) / (|a| * |b| + ε)`.
///
/// Returns `None` when the vectors differ in length; callers must not
/// compare embeddings from different models or dimensions.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    Some(dot / (norm_a.sqrt() * norm_b.sqrt() + SIMILARITY_EPSILON))
}
