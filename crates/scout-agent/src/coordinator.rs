// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming phase coordinator.
//!
//! Runs one turn as a fixed sequence of phases and reports each transition
//! and every visible piece of the answer as a [`StreamEvent`]:
//!
//! ```text
//! analysis -> search_decision -> (search_planning -> rounds -> content_processing)?
//!          -> response_generation -> evaluation -> complete
//! ```
//!
//! Every phase except the answer stream degrades instead of failing: its
//! error becomes an `error` thought and the turn continues on a simpler path.
//! A failed answer stream ends the turn with a single `error` event.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::{Stream, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, info, warn};

use scout_config::ScoutConfig;
use scout_core::{
    ChatMessage, ChatRequest, Complexity, DocumentStore, GenerationBackend, PageFetcher,
    ScoutError, SearchBackend, SearchResult, Thought, ThoughtType,
};
use scout_decision::{DecisionEngine, ReasoningFilter, SearchDecision};
use scout_memory::{Embedder, MemoryExtractor, MemoryStore};
use scout_search::{SearchAccumulator, SearchOrchestrator, SearchSettings, should_continue_searching};

use crate::events::{Phase, PhaseDetail, Source, StreamEvent, TurnSummary};
use crate::prompt;
use crate::session::{SessionStore, is_valid_session_id};

/// A user message to answer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default = "enabled")]
    pub search_enabled: bool,
    #[serde(default = "enabled")]
    pub memory_enabled: bool,
}

fn enabled() -> bool {
    true
}

impl TurnRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: None,
            search_enabled: true,
            memory_enabled: true,
        }
    }

    fn prepare(self) -> Result<Turn, ScoutError> {
        let message = self.message.trim().to_string();
        if message.is_empty() {
            return Err(ScoutError::InvalidRequest("message must not be empty".into()));
        }
        let session_id = match self.session_id {
            Some(id) if is_valid_session_id(&id) => id,
            Some(id) => {
                return Err(ScoutError::InvalidRequest(format!(
                    "invalid session id {id:?}"
                )));
            }
            None => uuid::Uuid::new_v4().to_string(),
        };
        Ok(Turn {
            message,
            session_id,
            search_enabled: self.search_enabled,
            memory_enabled: self.memory_enabled,
        })
    }
}

/// A validated request.
#[derive(Debug, Clone)]
struct Turn {
    message: String,
    session_id: String,
    search_enabled: bool,
    memory_enabled: bool,
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Completed(TurnSummary),
    /// The answer stream failed; an `error` event was emitted.
    Failed(String),
    /// The event receiver went away before the turn finished.
    Cancelled,
}

/// Per-turn knobs taken from configuration.
#[derive(Debug, Clone)]
pub struct TurnSettings {
    pub model: String,
    pub temperature: f32,
    pub stream_idle_timeout: Duration,
    pub system_prompt: String,
    pub max_queries: usize,
    pub max_rounds: usize,
    pub retrieval_k: usize,
    pub min_similarity: f32,
    pub history_turns: usize,
}

impl TurnSettings {
    pub fn from_config(config: &ScoutConfig) -> Self {
        Self {
            model: config.generation.model.clone(),
            temperature: config.generation.temperature,
            stream_idle_timeout: config.generation.stream_idle_timeout(),
            system_prompt: config
                .agent
                .system_prompt
                .clone()
                .unwrap_or_else(|| prompt::DEFAULT_SYSTEM_PROMPT.to_string()),
            max_queries: config.search.max_queries,
            max_rounds: config.search.max_rounds,
            retrieval_k: config.memory.retrieval_k,
            min_similarity: config.memory.min_similarity,
            history_turns: config.session.history_turns,
        }
    }
}

/// Receiving side of a running turn. Dropping it cancels the turn.
pub struct TurnHandle {
    session_id: String,
    events: mpsc::Receiver<StreamEvent>,
    _cancel_on_drop: DropGuard,
}

impl TurnHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Waits for the next event. `None` once the turn has finished.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.events.recv().await
    }

    pub fn into_stream(self) -> impl Stream<Item = StreamEvent> + Send + 'static {
        futures::stream::unfold(self, |mut handle| async move {
            let event = handle.events.recv().await?;
            Some((event, handle))
        })
    }
}

/// Sends events, turning a vanished receiver into cancellation.
struct Emitter {
    tx: mpsc::Sender<StreamEvent>,
    cancel: CancellationToken,
}

impl Emitter {
    async fn emit(&self, event: StreamEvent) {
        if self.cancel.is_cancelled() {
            return;
        }
        let name = event.name();
        if self.tx.send(event).await.is_err() {
            debug!(event = name, "client disconnected, cancelling turn");
            self.cancel.cancel();
        }
    }
}

#[derive(Debug, Default)]
struct SearchOutcome {
    sources: Vec<SearchResult>,
    queries_used: Vec<String>,
    rounds: usize,
    thought_count: usize,
}

fn search_skipped(reason: &str) -> SearchDecision {
    SearchDecision {
        needs_search: false,
        confidence: 1.0,
        reasoning: reason.to_string(),
        thoughts: vec![Thought::new(ThoughtType::SearchDecision, reason)],
    }
}

/// Sequences the phases of a turn.
pub struct Coordinator {
    generation: Arc<dyn GenerationBackend>,
    decision: DecisionEngine,
    search: Option<SearchOrchestrator>,
    memory: Option<Arc<MemoryStore>>,
    extractor: Option<MemoryExtractor>,
    sessions: SessionStore,
    settings: TurnSettings,
}

impl Coordinator {
    pub fn new(
        generation: Arc<dyn GenerationBackend>,
        decision: DecisionEngine,
        sessions: SessionStore,
        settings: TurnSettings,
    ) -> Self {
        Self {
            generation,
            decision,
            search: None,
            memory: None,
            extractor: None,
            sessions,
            settings,
        }
    }

    pub fn with_search(mut self, orchestrator: SearchOrchestrator) -> Self {
        self.search = Some(orchestrator);
        self
    }

    pub fn with_memory(mut self, store: Arc<MemoryStore>, extractor: MemoryExtractor) -> Self {
        self.memory = Some(store);
        self.extractor = Some(extractor);
        self
    }

    /// Wires a coordinator from configuration. Search and memory are attached
    /// only when enabled in their config sections.
    pub fn from_config(
        config: &ScoutConfig,
        generation: Arc<dyn GenerationBackend>,
        search: Arc<dyn SearchBackend>,
        fetcher: Arc<dyn PageFetcher>,
        docs: Arc<dyn DocumentStore>,
    ) -> Self {
        let decision = DecisionEngine::from_config(generation.clone(), &config.generation);
        let mut coordinator = Self::new(
            generation.clone(),
            decision,
            SessionStore::new(docs.clone()),
            TurnSettings::from_config(config),
        );

        if config.search.enabled {
            let settings =
                SearchSettings::from_config(&config.generation, &config.search, &config.extraction);
            coordinator = coordinator.with_search(SearchOrchestrator::new(
                generation.clone(),
                search,
                fetcher,
                settings,
            ));
        }

        if config.memory.enabled {
            let embedder = Embedder::from_config(generation.clone(), &config.generation);
            let store = MemoryStore::new(docs, embedder)
                .with_duplicate_threshold(config.memory.duplicate_threshold);
            let extractor = MemoryExtractor::new(
                generation,
                config.generation.model.clone(),
                config.generation.request_timeout(),
                config.memory.max_extracted_items,
            );
            coordinator = coordinator.with_memory(Arc::new(store), extractor);
        }

        coordinator
    }

    pub fn memory(&self) -> Option<&Arc<MemoryStore>> {
        self.memory.as_ref()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Validates `request` and runs it on a background task.
    ///
    /// Invalid requests fail here, before any event exists.
    pub fn start(
        self: &Arc<Self>,
        request: TurnRequest,
        buffer: usize,
    ) -> Result<TurnHandle, ScoutError> {
        let turn = request.prepare()?;
        let session_id = turn.session_id.clone();
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let cancel = CancellationToken::new();

        let this = Arc::clone(self);
        let token = cancel.clone();
        tokio::spawn(async move {
            this.drive(turn, tx, token).await;
        });

        Ok(TurnHandle {
            session_id,
            events: rx,
            _cancel_on_drop: cancel.drop_guard(),
        })
    }

    /// Runs a turn on the current task, sending events to `events`.
    pub async fn run(
        &self,
        request: TurnRequest,
        events: mpsc::Sender<StreamEvent>,
        cancel: CancellationToken,
    ) -> Result<TurnOutcome, ScoutError> {
        let turn = request.prepare()?;
        Ok(self.drive(turn, events, cancel).await)
    }

    async fn drive(
        &self,
        turn: Turn,
        events: mpsc::Sender<StreamEvent>,
        cancel: CancellationToken,
    ) -> TurnOutcome {
        let out = Emitter {
            tx: events,
            cancel: cancel.clone(),
        };
        let session_id = turn.session_id.clone();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(session_id = %session_id, "turn cancelled");
                TurnOutcome::Cancelled
            }
            outcome = self.execute(turn, &out) => {
                if cancel.is_cancelled() {
                    TurnOutcome::Cancelled
                } else {
                    outcome
                }
            }
        }
    }

    async fn execute(&self, turn: Turn, out: &Emitter) -> TurnOutcome {
        let started = Instant::now();
        let query = turn.message.as_str();
        let mut thought_count = 0;
        info!(session_id = %turn.session_id, "turn started");

        out.emit(StreamEvent::ThinkingStart {
            phase: Phase::Analysis,
        })
        .await;
        let analysis = self.decision.analyze_query(query).await;
        thought_count += analysis.thoughts.len();
        out.emit(StreamEvent::ThinkingUpdate {
            phase: Phase::Analysis,
            thoughts: analysis.thoughts.clone(),
            detail: PhaseDetail::Analysis {
                summary: analysis.summary.clone(),
                complexity: analysis.complexity,
            },
        })
        .await;

        out.emit(StreamEvent::ThinkingStart {
            phase: Phase::SearchDecision,
        })
        .await;
        let search = self.search.as_ref().filter(|_| turn.search_enabled);
        let decision = match search {
            Some(_) => self.decision.determine_search_need(query, &analysis).await,
            None => search_skipped("Web search is disabled for this turn."),
        };
        thought_count += decision.thoughts.len();
        out.emit(StreamEvent::ThinkingUpdate {
            phase: Phase::SearchDecision,
            thoughts: decision.thoughts.clone(),
            detail: PhaseDetail::SearchDecision {
                needs_search: decision.needs_search,
                confidence: decision.confidence,
                reasoning: decision.reasoning.clone(),
            },
        })
        .await;

        let gathered = match search {
            Some(search) if decision.needs_search => {
                self.search_phase(search, query, analysis.complexity, out)
                    .await
            }
            _ => SearchOutcome::default(),
        };
        thought_count += gathered.thought_count;

        let memory = self.memory.as_ref().filter(|_| turn.memory_enabled);
        let memories = match memory {
            Some(store) => {
                store
                    .retrieve(query, self.settings.retrieval_k, self.settings.min_similarity)
                    .await
            }
            None => Vec::new(),
        };

        let history = match self.sessions.load(&turn.session_id).await {
            Ok(transcript) => transcript.recent_messages(self.settings.history_turns),
            Err(e) => {
                warn!(session_id = %turn.session_id, error = %e, "failed to load transcript");
                Vec::new()
            }
        };

        let context = prompt::grounding_context(&memories, &gathered.sources);
        let plan = self.decision.plan_response(query, &context).await;
        thought_count += plan.thoughts.len();
        out.emit(StreamEvent::ResponseGeneration {
            memories_used: memories.len(),
            source_count: gathered.sources.len(),
            plan: plan.strategy.clone(),
            thoughts: plan.thoughts,
        })
        .await;

        let messages = prompt::answer_messages(
            &self.settings.system_prompt,
            &context,
            &plan.strategy,
            history,
            query,
        );
        let (answer, reasoning) = match self.stream_answer(messages, out).await {
            Ok(generated) => generated,
            Err(e) => {
                error!(session_id = %turn.session_id, error = %e, "answer generation failed");
                let message = format!("Failed to generate a response: {e}");
                out.emit(StreamEvent::Error {
                    message: message.clone(),
                })
                .await;
                return TurnOutcome::Failed(message);
            }
        };
        thought_count += reasoning.len();
        out.emit(StreamEvent::ResponseComplete {
            content: answer.clone(),
            thoughts: reasoning,
        })
        .await;

        out.emit(StreamEvent::ThinkingStart {
            phase: Phase::Evaluation,
        })
        .await;
        let mut evaluation = self.decision.evaluate_response(query, &answer).await;

        let mut memory_items_added = 0;
        if let (Some(store), Some(extractor)) = (memory, &self.extractor) {
            if !answer.is_empty() {
                match self.remember(store, extractor, query, &answer).await {
                    Ok(added) => memory_items_added = added,
                    Err(e) => {
                        if e.is_recoverable() {
                            warn!(error = %e, "memory extraction failed");
                        } else {
                            error!(error = %e, "memory extraction failed");
                        }
                        evaluation.thoughts.push(Thought::new(
                            ThoughtType::Error,
                            format!("Could not update memory from this exchange: {e}"),
                        ));
                    }
                }
            }
        }

        thought_count += evaluation.thoughts.len();
        out.emit(StreamEvent::ThinkingUpdate {
            phase: Phase::Evaluation,
            thoughts: evaluation.thoughts,
            detail: PhaseDetail::Evaluation {
                assessment: evaluation.assessment,
            },
        })
        .await;

        if !answer.is_empty() {
            if let Err(e) = self.sessions.append(&turn.session_id, query, &answer).await {
                warn!(session_id = %turn.session_id, error = %e, "failed to save transcript");
            }
        }

        let summary = TurnSummary {
            used_search: !gathered.sources.is_empty(),
            sources: gathered.sources.iter().map(Source::from).collect(),
            source_count: gathered.sources.len(),
            thought_count,
            memory_items_added,
            memories_used: memories.len(),
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            queries_used: gathered.queries_used,
            search_rounds: gathered.rounds,
            session_id: turn.session_id,
        };
        info!(
            session_id = %summary.session_id,
            used_search = summary.used_search,
            sources = summary.source_count,
            elapsed_ms = summary.elapsed_ms,
            "turn complete"
        );
        out.emit(StreamEvent::Complete(summary.clone())).await;
        TurnOutcome::Completed(summary)
    }

    async fn search_phase(
        &self,
        search: &SearchOrchestrator,
        query: &str,
        complexity: Complexity,
        out: &Emitter,
    ) -> SearchOutcome {
        let mut outcome = SearchOutcome::default();

        out.emit(StreamEvent::ThinkingStart {
            phase: Phase::SearchPlanning,
        })
        .await;
        let plan = search.generate_queries(query, self.settings.max_queries).await;
        outcome.thought_count += plan.thoughts.len();
        out.emit(StreamEvent::ThinkingUpdate {
            phase: Phase::SearchPlanning,
            thoughts: plan.thoughts,
            detail: PhaseDetail::SearchPlanning {
                queries: plan.queries.clone(),
            },
        })
        .await;

        let mut accumulator = SearchAccumulator::new();
        for (index, search_query) in plan
            .queries
            .iter()
            .take(self.settings.max_rounds)
            .enumerate()
        {
            let round = index + 1;
            out.emit(StreamEvent::SearchStart {
                round,
                query: search_query.clone(),
            })
            .await;

            let mut thoughts = Vec::new();
            let (fresh, error) = match search.run_query(search_query).await {
                Ok(results) => (accumulator.add(results), None),
                Err(e) => {
                    if e.is_recoverable() {
                        warn!(round, query = %search_query, error = %e, "search round failed");
                    } else {
                        error!(round, query = %search_query, error = %e, "search round failed");
                    }
                    thoughts.push(Thought::new(
                        ThoughtType::Error,
                        format!("Search for \"{search_query}\" failed: {e}"),
                    ));
                    (Vec::new(), Some(e.to_string()))
                }
            };
            outcome.thought_count += thoughts.len();
            outcome.rounds = round;
            outcome.queries_used.push(search_query.clone());

            let next = should_continue_searching(accumulator.len(), complexity);
            out.emit(StreamEvent::SearchResults {
                round,
                query: search_query.clone(),
                results: fresh,
                total_results: accumulator.len(),
                continue_searching: next.continue_searching,
                reasoning: next.reasoning,
                error,
                thoughts,
            })
            .await;
            if !next.continue_searching {
                debug!(round, results = accumulator.len(), "search finished early");
                break;
            }
        }

        let results = accumulator.into_results();
        let pages_requested = search.settings().max_pages.min(results.len());
        let sources = search.process_content(results).await;
        let pages_extracted = sources
            .iter()
            .filter(|r| r.extracted_content.is_some())
            .count();
        out.emit(StreamEvent::ContentProcessing {
            pages_requested,
            pages_extracted,
        })
        .await;

        outcome.sources = sources;
        outcome
    }

    /// Streams the answer through the reasoning filter. Returns the visible
    /// answer and the reasoning blocks hidden from it.
    async fn stream_answer(
        &self,
        messages: Vec<ChatMessage>,
        out: &Emitter,
    ) -> Result<(String, Vec<Thought>), ScoutError> {
        let mut stream = self
            .generation
            .chat_stream(ChatRequest {
                model: self.settings.model.clone(),
                messages,
                temperature: Some(self.settings.temperature),
                timeout: self.settings.stream_idle_timeout,
            })
            .await?;

        let mut filter = ReasoningFilter::new();
        let mut visible = String::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            let text = filter.push(&chunk.content);
            if !text.is_empty() {
                visible.push_str(&text);
                out.emit(StreamEvent::ResponseChunk { content: text }).await;
            }
            if chunk.done {
                break;
            }
        }

        let tail = filter.finish();
        if !tail.is_empty() {
            visible.push_str(&tail);
            out.emit(StreamEvent::ResponseChunk { content: tail }).await;
        }

        let thoughts = filter
            .thoughts()
            .iter()
            .map(|t| Thought::new(ThoughtType::Reasoning, t.as_str()))
            .collect();
        Ok((visible.trim().to_string(), thoughts))
    }

    async fn remember(
        &self,
        store: &MemoryStore,
        extractor: &MemoryExtractor,
        query: &str,
        answer: &str,
    ) -> Result<usize, ScoutError> {
        let candidates = extractor.extract(query, answer).await?;
        if candidates.is_empty() {
            return Ok(0);
        }
        let inserted = store.upsert(candidates).await?;
        debug!(count = inserted.len(), "memories stored");
        Ok(inserted.len())
    }
}
