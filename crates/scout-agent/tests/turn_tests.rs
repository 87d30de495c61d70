// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end turns over mock backends.

use scout_agent::{StreamEvent, TurnRequest, TurnSummary};
use scout_core::{ScoutError, SearchResult, Thought, ThoughtType};
use scout_test_utils::{TestHarness, event_names};

const PAGE_TEXT: &str = "Paris is mild today with light winds from the west. Temperatures \
reach eighteen degrees in the afternoon and fall to nine overnight, with a small chance of rain.";

fn weather_results() -> Vec<SearchResult> {
    (1..=4)
        .map(|i| {
            SearchResult::new(
                format!("Paris weather {i}"),
                format!("https://weather{i}.example/paris"),
                "Forecast for Paris",
            )
        })
        .collect()
}

async fn weather_harness() -> TestHarness {
    let mut builder = TestHarness::builder().with_search_results(weather_results());
    for i in 1..=4 {
        builder = builder.with_page(&format!("https://weather{i}.example/paris"), PAGE_TEXT);
    }
    builder.build().await.unwrap()
}

fn summary(events: &[StreamEvent]) -> &TurnSummary {
    match events.last() {
        Some(StreamEvent::Complete(summary)) => summary,
        other => panic!("turn did not complete: {other:?}"),
    }
}

fn answer(events: &[StreamEvent]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::ResponseChunk { content } => Some(content.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn current_weather_question_searches_and_cites_sources() {
    let harness = weather_harness().await;
    let events = harness
        .ask("What's the current weather in Paris?")
        .await
        .unwrap();
    let names = event_names(&events);

    assert!(names.contains(&"search_start"));
    assert!(names.contains(&"response_chunk"));
    let summary = summary(&events);
    assert!(summary.used_search);
    assert_eq!(summary.sources.len(), 4);
    assert_eq!(summary.source_count, 4);
    assert_eq!(summary.search_rounds, 1);
    assert_eq!(summary.queries_used, vec!["What's the current weather in Paris?"]);
    assert_eq!(harness.fetcher.fetched().len(), 4);
    assert_eq!(answer(&events), "mock response");
}

#[tokio::test]
async fn events_follow_canonical_order() {
    let harness = weather_harness().await;
    let events = harness
        .ask("What's the current weather in Paris?")
        .await
        .unwrap();

    let mut names = event_names(&events);
    names.dedup();
    assert_eq!(
        names,
        vec![
            "thinking_start",
            "thinking_update",
            "thinking_start",
            "thinking_update",
            "thinking_start",
            "thinking_update",
            "search_start",
            "search_results",
            "content_processing",
            "response_generation",
            "response_chunk",
            "response_complete",
            "thinking_start",
            "thinking_update",
            "complete",
        ]
    );

    let phases: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::ThinkingStart { phase } => Some(phase.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec!["analysis", "search_decision", "search_planning", "evaluation"]
    );

    match events.iter().find(|e| e.name() == "content_processing") {
        Some(StreamEvent::ContentProcessing {
            pages_requested,
            pages_extracted,
        }) => {
            assert_eq!(*pages_requested, 4);
            assert_eq!(*pages_extracted, 4);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn arithmetic_needs_no_search() {
    let harness = weather_harness().await;
    let events = harness.ask("What is 2+2?").await.unwrap();
    let names = event_names(&events);

    assert!(!names.contains(&"search_start"));
    assert!(!names.contains(&"content_processing"));
    let summary = summary(&events);
    assert!(!summary.used_search);
    assert!(summary.sources.is_empty());
    assert_eq!(summary.search_rounds, 0);
    assert!(harness.search.queries().is_empty());
}

#[tokio::test]
async fn rounds_stop_once_enough_results_arrive() {
    let harness = TestHarness::builder()
        .respond_when(
            "web search queries",
            "1. lisbon porto weather\n2. lisbon porto climate\n3. lisbon porto rain",
        )
        .build()
        .await
        .unwrap();
    harness.search.add_results(
        "lisbon porto weather",
        vec![
            SearchResult::new("A", "https://a.example", ""),
            SearchResult::new("B", "https://b.example", ""),
        ],
    );
    harness.search.add_results(
        "lisbon porto climate",
        vec![
            SearchResult::new("B again", "https://B.example", ""),
            SearchResult::new("C", "https://c.example", ""),
            SearchResult::new("D", "https://d.example", ""),
            SearchResult::new("E", "https://e.example", ""),
        ],
    );

    let events = harness
        .ask("Compare the current weather in Lisbon and Porto")
        .await
        .unwrap();
    let summary = summary(&events);

    assert_eq!(summary.search_rounds, 2);
    assert_eq!(
        summary.queries_used,
        vec!["lisbon porto weather", "lisbon porto climate"]
    );
    assert_eq!(summary.source_count, 5);

    let continues: Vec<bool> = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::SearchResults {
                continue_searching, ..
            } => Some(*continue_searching),
            _ => None,
        })
        .collect();
    assert_eq!(continues, vec![true, false]);
}

#[tokio::test]
async fn failed_search_falls_back_to_direct_answer() {
    let harness = weather_harness().await;
    harness.search.fail_all(true);

    let events = harness
        .ask("What's the latest news about Rust?")
        .await
        .unwrap();
    let names = event_names(&events);

    assert!(names.contains(&"search_start"));
    assert!(names.contains(&"response_chunk"));
    let errors: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::SearchResults { error, .. } => error.clone(),
            _ => None,
        })
        .collect();
    assert!(!errors.is_empty());
    let summary = summary(&events);
    assert!(!summary.used_search);
    assert_eq!(summary.source_count, 0);
}

fn emitted_thoughts(events: &[StreamEvent]) -> Vec<&Thought> {
    events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::ThinkingUpdate { thoughts, .. }
            | StreamEvent::SearchResults { thoughts, .. }
            | StreamEvent::ResponseGeneration { thoughts, .. }
            | StreamEvent::ResponseComplete { thoughts, .. } => Some(thoughts),
            _ => None,
        })
        .flatten()
        .collect()
}

#[tokio::test]
async fn thought_count_matches_thoughts_emitted() {
    let harness = TestHarness::builder()
        .with_search_results(weather_results())
        .respond_when(
            "careful research assistant",
            "<think>Recall the release notes.</think>Rust 1.90 shipped last month.",
        )
        .build()
        .await
        .unwrap();
    harness.search.fail_all(true);
    harness.backend.fail_completions(true);

    let events = harness
        .ask("What's the latest news about Rust?")
        .await
        .unwrap();
    let thoughts = emitted_thoughts(&events);
    assert_eq!(summary(&events).thought_count, thoughts.len());

    let round_thoughts: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::SearchResults { thoughts, .. } => Some(thoughts),
            _ => None,
        })
        .flatten()
        .collect();
    assert!(!round_thoughts.is_empty());
    assert!(round_thoughts.iter().all(|t| t.kind == ThoughtType::Error));

    let reasoning = events.iter().find_map(|e| match e {
        StreamEvent::ResponseComplete { content, thoughts } => Some((content, thoughts)),
        _ => None,
    });
    let (content, reasoning) = reasoning.unwrap();
    assert_eq!(content, "Rust 1.90 shipped last month.");
    assert_eq!(reasoning.len(), 1);
    assert_eq!(reasoning[0].content, "Recall the release notes.");
    assert_eq!(reasoning[0].kind, ThoughtType::Reasoning);

    assert!(
        thoughts
            .iter()
            .any(|t| t.kind == ThoughtType::Error && t.content.contains("memory"))
    );
    assert_eq!(summary(&events).memory_items_added, 0);
}

#[tokio::test]
async fn unterminated_reasoning_block_is_kept_in_the_answer() {
    let harness = TestHarness::builder()
        .respond_when("careful research assistant", "<think>never closed. The answer is 4")
        .build()
        .await
        .unwrap();

    let events = harness.ask("What is 2+2?").await.unwrap();
    assert_eq!(answer(&events), "<think>never closed. The answer is 4");
    let complete = events.iter().find_map(|e| match e {
        StreamEvent::ResponseComplete { content, thoughts } => Some((content, thoughts)),
        _ => None,
    });
    let (content, thoughts) = complete.unwrap();
    assert_eq!(content, "<think>never closed. The answer is 4");
    assert!(thoughts.is_empty());

    let session_id = &summary(&events).session_id;
    let transcript = harness.coordinator.sessions().load(session_id).await.unwrap();
    assert_eq!(transcript.turns.len(), 1);
    assert_eq!(
        transcript.turns[0].assistant,
        "<think>never closed. The answer is 4"
    );
}

#[tokio::test]
async fn stream_failure_ends_with_single_error_event() {
    let harness = weather_harness().await;
    harness.backend.fail_streams(true);

    let events = harness.ask("What is 2+2?").await.unwrap();
    let names = event_names(&events);

    assert_eq!(names.iter().filter(|n| **n == "error").count(), 1);
    assert_eq!(names.last(), Some(&"error"));
    assert!(!names.contains(&"response_complete"));
    assert!(!names.contains(&"complete"));
}

#[tokio::test]
async fn memories_are_extracted_deduplicated_and_recalled() {
    let harness = TestHarness::builder()
        .respond_when(
            "worth remembering",
            r#"[{"content": "The user is planning a trip to Lisbon", "tags": ["travel"], "importance": 0.8}]"#,
        )
        .build()
        .await
        .unwrap();

    let first = harness
        .ask("I am planning a trip to Lisbon, any tips?")
        .await
        .unwrap();
    assert_eq!(summary(&first).memory_items_added, 1);

    let second = harness
        .ask("Any advice about planning my trip to Lisbon?")
        .await
        .unwrap();
    let summary = summary(&second);
    assert!(summary.memories_used >= 1);
    assert_eq!(summary.memory_items_added, 0);

    let store = harness.coordinator.memory().unwrap();
    assert_eq!(store.items().await.unwrap().len(), 1);
    assert!(
        harness
            .backend
            .prompts()
            .iter()
            .any(|p| p.contains("- The user is planning a trip to Lisbon"))
    );
}

#[tokio::test]
async fn memory_can_be_disabled_per_request() {
    let harness = TestHarness::builder()
        .respond_when("worth remembering", r#"[{"content": "Some durable fact"}]"#)
        .build()
        .await
        .unwrap();

    let mut request = TurnRequest::new("Remember that I like green tea");
    request.memory_enabled = false;
    let events = harness.run(request).await.unwrap();
    assert_eq!(summary(&events).memory_items_added, 0);
    assert!(harness.coordinator.memory().unwrap().items().await.unwrap().is_empty());
}

#[tokio::test]
async fn session_history_feeds_the_next_answer() {
    let harness = weather_harness().await;

    let mut first = TurnRequest::new("My name is Ada and I write compilers.");
    first.session_id = Some("sess-1".into());
    let events = harness.run(first).await.unwrap();
    assert_eq!(summary(&events).session_id, "sess-1");

    let mut second = TurnRequest::new("What do I do for work?");
    second.session_id = Some("sess-1".into());
    harness.run(second).await.unwrap();

    let transcript = harness.coordinator.sessions().load("sess-1").await.unwrap();
    assert_eq!(transcript.turns.len(), 2);
    assert_eq!(transcript.turns[0].assistant, "mock response");
    assert!(
        harness
            .backend
            .prompts()
            .iter()
            .any(|p| p.contains("I write compilers") && p.contains("What do I do for work?"))
    );
}

#[tokio::test]
async fn invalid_requests_are_rejected_before_any_event() {
    let harness = weather_harness().await;
    assert!(matches!(
        harness.ask("   ").await,
        Err(ScoutError::InvalidRequest(_))
    ));

    let mut request = TurnRequest::new("hello");
    request.session_id = Some("../../etc/passwd".into());
    assert!(matches!(
        harness.run(request).await,
        Err(ScoutError::InvalidRequest(_))
    ));
}

#[tokio::test]
async fn search_can_be_disabled_per_request() {
    let harness = weather_harness().await;
    let mut request = TurnRequest::new("What's the current weather in Paris?");
    request.search_enabled = false;

    let events = harness.run(request).await.unwrap();
    assert!(!event_names(&events).contains(&"search_start"));
    assert!(harness.search.queries().is_empty());
}
