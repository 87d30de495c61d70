// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation backend for deterministic testing.
//!
//! Replies are chosen by the first registered rule whose pattern occurs in
//! the prompt, then from a FIFO queue, then a default "mock response".
//! Embeddings are hashed bags of words, so texts with the same words in any
//! order and case embed identically.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::stream;

use scout_core::{
    ChatChunk, ChatMessage, ChatRequest, ChunkStream, CompletionRequest, EmbeddingOutput,
    EmbeddingRequest, GenerationBackend, HealthStatus, PluginAdapter, ScoutError,
};

/// Dimensionality of mock embeddings.
pub const MOCK_DIMENSIONS: usize = 384;

const DEFAULT_RESPONSE: &str = "mock response";

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Embeds `text` as a bag of lowercase alphanumeric tokens hashed with FNV-1a.
pub fn mock_embedding(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0; MOCK_DIMENSIONS];
    for token in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in token.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        vector[(hash % MOCK_DIMENSIONS as u64) as usize] += 1.0;
    }
    vector
}

/// A generation backend with scripted replies.
#[derive(Default)]
pub struct MockBackend {
    rules: Mutex<Vec<(String, String)>>,
    queue: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    fail_completions: AtomicBool,
    fail_streams: AtomicBool,
    fail_embeddings: AtomicBool,
    completion_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies with `response` whenever the prompt contains `pattern`.
    /// Earlier rules win.
    pub fn respond_when(&self, pattern: &str, response: &str) {
        lock(&self.rules).push((pattern.to_string(), response.to_string()));
    }

    /// Queues a reply for the next call that no rule matches.
    pub fn push_response(&self, response: &str) {
        lock(&self.queue).push_back(response.to_string());
    }

    /// Makes `chat` and `complete` fail with an upstream error.
    pub fn fail_completions(&self, fail: bool) {
        self.fail_completions.store(fail, Ordering::SeqCst);
    }

    /// Makes `chat_stream` fail with an upstream error.
    pub fn fail_streams(&self, fail: bool) {
        self.fail_streams.store(fail, Ordering::SeqCst);
    }

    /// Makes `embed` fail with an upstream error.
    pub fn fail_embeddings(&self, fail: bool) {
        self.fail_embeddings.store(fail, Ordering::SeqCst);
    }

    /// Every prompt seen so far, chat transcripts joined by newlines.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    /// Number of `complete` calls, including failed ones.
    pub fn completion_calls(&self) -> usize {
        self.completion_calls.load(Ordering::SeqCst)
    }

    fn reply_for(&self, prompt: &str) -> String {
        lock(&self.prompts).push(prompt.to_string());
        if let Some((_, response)) = lock(&self.rules)
            .iter()
            .find(|(pattern, _)| prompt.contains(pattern.as_str()))
        {
            return response.clone();
        }
        lock(&self.queue)
            .pop_front()
            .unwrap_or_else(|| DEFAULT_RESPONSE.to_string())
    }

    fn check(&self, flag: &AtomicBool) -> Result<(), ScoutError> {
        if flag.load(Ordering::SeqCst) {
            Err(ScoutError::upstream("mock", "scripted failure"))
        } else {
            Ok(())
        }
    }
}

fn transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl PluginAdapter for MockBackend {
    fn name(&self) -> &str {
        "mock-backend"
    }

    async fn health_check(&self) -> Result<HealthStatus, ScoutError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn chat(&self, request: ChatRequest) -> Result<ChatMessage, ScoutError> {
        self.check(&self.fail_completions)?;
        Ok(ChatMessage::assistant(
            self.reply_for(&transcript(&request.messages)),
        ))
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ChunkStream, ScoutError> {
        self.check(&self.fail_streams)?;
        let reply = self.reply_for(&transcript(&request.messages));
        let mut chunks: Vec<Result<ChatChunk, ScoutError>> = reply
            .split_inclusive(' ')
            .map(|piece| {
                Ok(ChatChunk {
                    content: piece.to_string(),
                    done: false,
                })
            })
            .collect();
        chunks.push(Ok(ChatChunk {
            content: String::new(),
            done: true,
        }));
        Ok(Box::pin(stream::iter(chunks)))
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, ScoutError> {
        self.completion_calls.fetch_add(1, Ordering::SeqCst);
        self.check(&self.fail_completions)?;
        Ok(self.reply_for(&request.prompt))
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingOutput, ScoutError> {
        self.check(&self.fail_embeddings)?;
        let embeddings: Vec<Vec<f32>> = request.inputs.iter().map(|t| mock_embedding(t)).collect();
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: MOCK_DIMENSIONS,
        })
    }
}
