// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Scout.
//!
//! Serves conversational turns as Server-Sent Events plus a few read/clear
//! endpoints for memory and session transcripts. Routes:
//! - `POST /v1/chat`
//! - `GET /health`
//! - `GET /v1/memory?q=` and `DELETE /v1/memory`
//! - `GET /v1/sessions/{id}`

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{GatewayState, router, serve};
