// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway routes driven in-process over a mock pipeline.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use scout_core::PluginAdapter;
use scout_gateway::{GatewayState, router};
use scout_memory::MemoryCandidate;
use scout_test_utils::TestHarness;

fn app(harness: &TestHarness) -> axum::Router {
    let adapters: Vec<Arc<dyn PluginAdapter>> = vec![
        harness.backend.clone() as Arc<dyn PluginAdapter>,
        harness.search.clone() as Arc<dyn PluginAdapter>,
        harness.docs.clone() as Arc<dyn PluginAdapter>,
    ];
    router(GatewayState::new(
        harness.coordinator.clone(),
        adapters,
        harness.config.clone(),
    ))
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_str(&body_text(resp).await).unwrap()
}

#[tokio::test]
async fn chat_streams_named_events() {
    let harness = TestHarness::builder().build().await.unwrap();
    let resp = app(&harness)
        .oneshot(post_json(
            "/v1/chat",
            r#"{"message": "What is 2 + 2?", "sessionId": "s-1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let body = body_text(resp).await;
    assert!(body.contains("event: thinking_start"));
    assert!(body.contains("event: response_chunk"));
    assert!(body.contains(
        "event: response_complete\ndata: {\"content\":\"mock response\",\"thoughts\":[]}"
    ));
    assert!(body.contains("event: complete"));
    assert!(body.contains("\"sessionId\":\"s-1\""));
    assert!(!body.contains("event: error"));
}

#[tokio::test]
async fn empty_message_is_a_bad_request() {
    let harness = TestHarness::builder().build().await.unwrap();
    let resp = app(&harness)
        .oneshot(post_json("/v1/chat", r#"{"message": "   "}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert!(json["error"].as_str().unwrap().contains("must not be empty"));
    assert!(harness.backend.prompts().is_empty());
}

#[tokio::test]
async fn malformed_session_id_is_a_bad_request() {
    let harness = TestHarness::builder().build().await.unwrap();
    let resp = app(&harness)
        .oneshot(post_json(
            "/v1/chat",
            r#"{"message": "hello", "sessionId": "../etc/passwd"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_lists_every_adapter() {
    let harness = TestHarness::builder().build().await.unwrap();
    let resp = app(&harness).oneshot(get("/health")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    let adapters = json["adapters"].as_array().unwrap();
    assert_eq!(adapters.len(), 3);
    assert!(adapters.iter().all(|a| a["status"] == "healthy"));
    assert!(adapters.iter().any(|a| a["name"] == "sqlite"));
}

#[tokio::test]
async fn memory_lists_searches_and_clears() {
    let harness = TestHarness::builder().build().await.unwrap();
    let store = harness.coordinator.memory().unwrap();
    store
        .upsert(vec![
            MemoryCandidate::new("The user is planning a trip to Lisbon"),
            MemoryCandidate::new("Prefers metric units"),
        ])
        .await
        .unwrap();
    let app = app(&harness);

    let resp = app.clone().oneshot(get("/v1/memory")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items[0].get("embedding").is_none());
    assert!(items[0].get("similarity").is_none());

    let resp = app
        .clone()
        .oneshot(get("/v1/memory?q=planning%20a%20trip%20to%20Lisbon"))
        .await
        .unwrap();
    let json = body_json(resp).await;
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["content"], "The user is planning a trip to Lisbon");
    assert!(items[0]["similarity"].as_f64().unwrap() > 0.3);

    let resp = app
        .clone()
        .oneshot(Request::delete("/v1/memory").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(store.items().await.unwrap().is_empty());
}

#[tokio::test]
async fn memory_routes_404_when_disabled() {
    let harness = TestHarness::builder()
        .with_config(|c| c.memory.enabled = false)
        .build()
        .await
        .unwrap();
    let resp = app(&harness).oneshot(get("/v1/memory")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_transcript_after_a_turn() {
    let harness = TestHarness::builder().build().await.unwrap();
    let app = app(&harness);

    let resp = app
        .clone()
        .oneshot(post_json(
            "/v1/chat",
            r#"{"message": "What is 2 + 2?", "sessionId": "abc"}"#,
        ))
        .await
        .unwrap();
    // Drain the stream so the turn runs to completion.
    body_text(resp).await;

    let resp = app.clone().oneshot(get("/v1/sessions/abc")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["sessionId"], "abc");
    assert_eq!(json["turns"][0]["user"], "What is 2 + 2?");
    assert_eq!(json["turns"][0]["assistant"], "mock response");

    let resp = app.clone().oneshot(get("/v1/sessions/unknown")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.oneshot(get("/v1/sessions/bad%20id")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
