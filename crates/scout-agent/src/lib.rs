// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn orchestration for Scout.
//!
//! The [`Coordinator`] drives one conversational turn through analysis,
//! optional web search, memory retrieval, a streamed answer, evaluation, and
//! memory extraction, reporting progress as [`StreamEvent`]s over a bounded
//! channel. Session transcripts live in [`SessionStore`].

pub mod coordinator;
pub mod events;
pub mod prompt;
pub mod session;

pub use coordinator::{Coordinator, TurnHandle, TurnOutcome, TurnRequest, TurnSettings};
pub use events::{Phase, PhaseDetail, Source, StreamEvent, TurnSummary};
pub use session::{SessionStore, Transcript, TranscriptTurn, is_valid_session_id};
