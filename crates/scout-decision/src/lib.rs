// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decision engine for Scout.
//!
//! Analyzes a query, decides whether web search is needed, plans the answer,
//! and evaluates the produced answer. Every phase that calls the generation
//! backend splits `<think>` blocks out of the reply into [`scout_core::Thought`]s
//! before using the remainder.

pub mod complexity;
pub mod engine;
mod prompts;
pub mod reasoning;

pub use complexity::{derive_complexity, lexical_complexity};
pub use engine::{
    DecisionEngine, Evaluation, QueryAnalysis, ResponsePlan, SearchDecision, keyword_match,
};
pub use reasoning::{ReasoningFilter, ReasoningSplit, extract_thoughts};
