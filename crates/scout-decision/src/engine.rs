// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-phase decisions driven by the generation backend.
//!
//! Every operation fails soft: a backend error becomes an `error` thought and
//! a safe default, never a propagated error.

use std::sync::Arc;
use std::time::Duration;

use scout_config::model::GenerationConfig;
use scout_core::{
    Complexity, CompletionRequest, GenerationBackend, ScoutError, Thought, ThoughtType,
};
use tracing::{debug, warn};

use crate::complexity::{derive_complexity, lexical_complexity};
use crate::prompts;
use crate::reasoning::{ReasoningSplit, extract_thoughts};

/// Single words implying the answer depends on current information.
const RECENCY_WORDS: &[&str] = &[
    "current",
    "currently",
    "latest",
    "today",
    "tonight",
    "yesterday",
    "tomorrow",
    "news",
    "recent",
    "recently",
    "now",
    "breaking",
    "upcoming",
    "forecast",
];

const RECENCY_PHRASES: &[&str] = &[
    "this week",
    "this month",
    "this year",
    "right now",
    "as of",
    "last week",
    "last night",
];

const AFFIRMATIVE_TOKENS: &[&str] = &["yes", "search", "web", "current"];

const KEYWORD_CONFIDENCE: f32 = 0.9;
const AFFIRMED_CONFIDENCE: f32 = 0.7;
const DECLINED_CONFIDENCE: f32 = 0.6;
const FALLBACK_CONFIDENCE: f32 = 0.3;

/// Output of the analysis phase.
#[derive(Debug, Clone)]
pub struct QueryAnalysis {
    pub summary: String,
    pub complexity: Complexity,
    pub thoughts: Vec<Thought>,
}

/// Output of the search-decision phase.
#[derive(Debug, Clone)]
pub struct SearchDecision {
    pub needs_search: bool,
    pub confidence: f32,
    pub reasoning: String,
    pub thoughts: Vec<Thought>,
}

/// Output of the planning phase.
#[derive(Debug, Clone)]
pub struct ResponsePlan {
    pub strategy: String,
    pub thoughts: Vec<Thought>,
}

/// Advisory quality assessment of a finished answer.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub assessment: String,
    pub thoughts: Vec<Thought>,
}

/// Returns the first recency keyword or phrase found in `query`.
pub fn keyword_match(query: &str) -> Option<&'static str> {
    let lower = query.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    if let Some(word) = RECENCY_WORDS.iter().find(|k| words.contains(k)) {
        return Some(word);
    }
    let normalized = format!(" {} ", words.join(" "));
    RECENCY_PHRASES
        .iter()
        .find(|p| normalized.contains(&format!(" {p} ")))
        .copied()
}

/// Scans a decision reply for affirmative tokens. A leading "no" wins.
fn affirms(reply: &str) -> bool {
    let lower = reply.to_lowercase();
    let mut tokens = lower
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|t| !t.is_empty());

    match tokens.next() {
        None => false,
        Some("no") => false,
        Some(first) => {
            AFFIRMATIVE_TOKENS.contains(&first) || tokens.any(|t| AFFIRMATIVE_TOKENS.contains(&t))
        }
    }
}

fn first_sentence(text: &str) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    line.chars().take(300).collect()
}

fn thoughts_of(kind: ThoughtType, texts: Vec<String>) -> Vec<Thought> {
    texts.into_iter().map(|t| Thought::new(kind, t)).collect()
}

fn error_thought(phase: &str, err: &ScoutError) -> Thought {
    Thought::new(ThoughtType::Error, format!("{phase} failed: {err}"))
}

/// Drives the analysis, search-decision, planning, and evaluation phases.
#[derive(Clone)]
pub struct DecisionEngine {
    backend: Arc<dyn GenerationBackend>,
    model: String,
    timeout: Duration,
}

impl DecisionEngine {
    pub fn new(backend: Arc<dyn GenerationBackend>, model: String, timeout: Duration) -> Self {
        Self {
            backend,
            model,
            timeout,
        }
    }

    pub fn from_config(backend: Arc<dyn GenerationBackend>, config: &GenerationConfig) -> Self {
        Self::new(backend, config.model.clone(), config.request_timeout())
    }

    async fn ask(&self, prompt: String, system: Option<&str>) -> Result<ReasoningSplit, ScoutError> {
        let reply = self
            .backend
            .complete(CompletionRequest {
                model: self.model.clone(),
                prompt,
                system: system.map(str::to_string),
                temperature: Some(0.2),
                timeout: self.timeout,
            })
            .await?;
        Ok(extract_thoughts(&reply))
    }

    /// Summarizes the query and derives its complexity.
    pub async fn analyze_query(&self, query: &str) -> QueryAnalysis {
        let prompt = prompts::ANALYSIS_PROMPT.replace("{query}", query);
        match self.ask(prompt, Some(prompts::ANALYSIS_SYSTEM)).await {
            Ok(split) => {
                let complexity = derive_complexity(&split.cleaned, query);
                let mut thoughts = thoughts_of(ThoughtType::Analysis, split.thoughts);
                if !split.cleaned.is_empty() {
                    thoughts.push(Thought::new(ThoughtType::Analysis, split.cleaned.clone()));
                }
                debug!(%complexity, "query analyzed");
                QueryAnalysis {
                    summary: split.cleaned,
                    complexity,
                    thoughts,
                }
            }
            Err(e) => {
                warn!(error = %e, "analysis failed, using lexical complexity");
                QueryAnalysis {
                    summary: String::new(),
                    complexity: lexical_complexity(query),
                    thoughts: vec![error_thought("Analysis", &e)],
                }
            }
        }
    }

    /// Decides whether the query needs web search.
    ///
    /// A recency keyword decides immediately; otherwise the backend is asked
    /// and its reply scanned for affirmative tokens.
    pub async fn determine_search_need(
        &self,
        query: &str,
        analysis: &QueryAnalysis,
    ) -> SearchDecision {
        if let Some(keyword) = keyword_match(query) {
            let reasoning =
                format!("The question mentions \"{keyword}\", which implies current information.");
            return SearchDecision {
                needs_search: true,
                confidence: KEYWORD_CONFIDENCE,
                thoughts: vec![Thought::new(ThoughtType::SearchDecision, reasoning.clone())],
                reasoning,
            };
        }

        let prompt = prompts::SEARCH_DECISION_PROMPT
            .replace("{query}", query)
            .replace("{analysis}", &analysis.summary);

        let (needs_search, confidence, reasoning, mut thoughts) = match self.ask(prompt, None).await
        {
            Ok(split) if !split.cleaned.is_empty() => {
                let needs = affirms(&split.cleaned);
                let confidence = if needs {
                    AFFIRMED_CONFIDENCE
                } else {
                    DECLINED_CONFIDENCE
                };
                (
                    needs,
                    confidence,
                    first_sentence(&split.cleaned),
                    thoughts_of(ThoughtType::Reasoning, split.thoughts),
                )
            }
            Ok(split) => (
                false,
                FALLBACK_CONFIDENCE,
                "No usable search decision; answering from existing knowledge.".to_string(),
                thoughts_of(ThoughtType::Reasoning, split.thoughts),
            ),
            Err(e) => {
                warn!(error = %e, "search decision failed, skipping search");
                (
                    false,
                    FALLBACK_CONFIDENCE,
                    "Search decision unavailable; answering from existing knowledge.".to_string(),
                    vec![error_thought("Search decision", &e)],
                )
            }
        };

        thoughts.push(Thought::new(ThoughtType::SearchDecision, reasoning.clone()));
        debug!(needs_search, confidence, "search decision made");
        SearchDecision {
            needs_search,
            confidence,
            reasoning,
            thoughts,
        }
    }

    /// Sketches how the answer should be structured.
    pub async fn plan_response(&self, query: &str, context: &str) -> ResponsePlan {
        let context = if context.trim().is_empty() {
            "none"
        } else {
            context
        };
        let prompt = prompts::PLAN_PROMPT
            .replace("{query}", query)
            .replace("{context}", context);

        match self.ask(prompt, None).await {
            Ok(split) => {
                let mut thoughts = thoughts_of(ThoughtType::Reasoning, split.thoughts);
                if !split.cleaned.is_empty() {
                    thoughts.push(Thought::new(ThoughtType::Reasoning, split.cleaned.clone()));
                }
                ResponsePlan {
                    strategy: split.cleaned,
                    thoughts,
                }
            }
            Err(e) => {
                warn!(error = %e, "planning failed");
                ResponsePlan {
                    strategy: String::new(),
                    thoughts: vec![error_thought("Planning", &e)],
                }
            }
        }
    }

    /// Assesses a finished answer. Advisory only.
    pub async fn evaluate_response(&self, query: &str, answer: &str) -> Evaluation {
        let prompt = prompts::EVALUATION_PROMPT
            .replace("{query}", query)
            .replace("{answer}", answer);

        match self.ask(prompt, None).await {
            Ok(split) => {
                let mut thoughts = thoughts_of(ThoughtType::Reasoning, split.thoughts);
                if !split.cleaned.is_empty() {
                    thoughts.push(Thought::new(ThoughtType::Reasoning, split.cleaned.clone()));
                }
                Evaluation {
                    assessment: split.cleaned,
                    thoughts,
                }
            }
            Err(e) => {
                warn!(error = %e, "evaluation failed");
                Evaluation {
                    assessment: String::new(),
                    thoughts: vec![error_thought("Evaluation", &e)],
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_test_utils::MockBackend;

    fn engine(backend: Arc<MockBackend>) -> DecisionEngine {
        DecisionEngine::new(backend, "test-model".into(), Duration::from_secs(1))
    }

    fn empty_analysis() -> QueryAnalysis {
        QueryAnalysis {
            summary: String::new(),
            complexity: Complexity::Medium,
            thoughts: Vec::new(),
        }
    }

    #[test]
    fn keywords_match_whole_words_and_phrases() {
        assert_eq!(
            keyword_match("What's the current weather in Paris?"),
            Some("current")
        );
        assert_eq!(keyword_match("Any NEWS about Rust?"), Some("news"));
        assert_eq!(keyword_match("releases this week"), Some("this week"));
        assert_eq!(keyword_match("What is 2+2?"), None);
        assert_eq!(keyword_match("What is knowledge?"), None);
    }

    #[test]
    fn affirmative_scan() {
        assert!(affirms("YES, this needs fresh data."));
        assert!(affirms("It would help to search the web."));
        assert!(!affirms("No. A web search is not needed."));
        assert!(!affirms("This is simple arithmetic."));
        assert!(!affirms(""));
    }

    #[tokio::test]
    async fn keyword_short_circuits_backend() {
        let backend = Arc::new(MockBackend::new());
        let engine = engine(backend.clone());
        let decision = engine
            .determine_search_need("latest Rust release?", &empty_analysis())
            .await;
        assert!(decision.needs_search);
        assert!((decision.confidence - 0.9).abs() < f32::EPSILON);
        assert_eq!(backend.completion_calls(), 0);
        assert_eq!(decision.thoughts[0].kind, ThoughtType::SearchDecision);
    }

    #[tokio::test]
    async fn backend_decision_is_scanned() {
        let backend = Arc::new(MockBackend::new());
        backend.respond_when(
            "requires searching the web",
            "<think>it is about prices</think>YES - prices change.",
        );
        let decision = engine(backend)
            .determine_search_need("How much is a Raspberry Pi?", &empty_analysis())
            .await;
        assert!(decision.needs_search);
        assert_eq!(decision.reasoning, "YES - prices change.");
        assert_eq!(decision.thoughts.len(), 2);
        assert_eq!(decision.thoughts[0].content, "it is about prices");
    }

    #[tokio::test]
    async fn backend_failure_means_no_search() {
        let backend = Arc::new(MockBackend::new());
        backend.fail_completions(true);
        let decision = engine(backend)
            .determine_search_need("What is 2+2?", &empty_analysis())
            .await;
        assert!(!decision.needs_search);
        assert_eq!(decision.thoughts[0].kind, ThoughtType::Error);
    }

    #[tokio::test]
    async fn analysis_reads_complexity_line() {
        let backend = Arc::new(MockBackend::new());
        backend.respond_when(
            "Analyze this question",
            "<think>hmm</think>Needs a comparison.\nCOMPLEXITY: high",
        );
        let analysis = engine(backend).analyze_query("rust or go?").await;
        assert_eq!(analysis.complexity, Complexity::High);
        assert_eq!(analysis.thoughts.len(), 2);
        assert!(analysis.thoughts.iter().all(|t| t.kind == ThoughtType::Analysis));
    }

    #[tokio::test]
    async fn analysis_failure_falls_back_to_lexical() {
        let backend = Arc::new(MockBackend::new());
        backend.fail_completions(true);
        let analysis = engine(backend).analyze_query("What is 2+2?").await;
        assert_eq!(analysis.complexity, Complexity::Low);
        assert_eq!(analysis.thoughts[0].kind, ThoughtType::Error);
    }

    #[tokio::test]
    async fn evaluation_is_advisory() {
        let backend = Arc::new(MockBackend::new());
        backend.respond_when("Assess this answer", "Accurate and complete.");
        let eval = engine(backend).evaluate_response("q", "a").await;
        assert_eq!(eval.assessment, "Accurate and complete.");
        assert_eq!(eval.thoughts[0].kind, ThoughtType::Reasoning);
    }
}
