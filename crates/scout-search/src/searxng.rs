// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SearXNG search backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use scout_config::model::SearchConfig;
use scout_core::{HealthStatus, PluginAdapter, ScoutError, SearchBackend, SearchResult, with_timeout};

const SERVICE: &str = "searxng";

/// Endpoint shapes tried in order. Instances differ in which they expose.
const VARIANTS: &[(&str, bool)] = &[("/search", true), ("/", true), ("/search.json", false)];

#[derive(Debug, Default, Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Vec<SearxResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearxResult {
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
}

impl SearxResult {
    fn into_result(self) -> Option<SearchResult> {
        let url = self.url?.trim().to_string();
        let title = self.title?.trim().to_string();
        if !url.starts_with("http") || title.is_empty() {
            return None;
        }
        Some(SearchResult::new(
            title,
            url,
            self.content.unwrap_or_default().trim(),
        ))
    }
}

fn upstream(message: impl Into<String>) -> ScoutError {
    ScoutError::upstream(SERVICE, message)
}

/// Search backend for a SearXNG instance with the JSON format enabled.
#[derive(Debug, Clone)]
pub struct SearxngBackend {
    client: reqwest::Client,
    base_url: String,
}

impl SearxngBackend {
    pub fn new(base_url: &str) -> Result<Self, ScoutError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| upstream(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self, ScoutError> {
        Self::new(&config.base_url)
    }

    fn variant_url(&self, path: &str, with_format: bool, query: &str) -> Result<Url, ScoutError> {
        let base = format!("{}{path}", self.base_url);
        let parsed = if with_format {
            Url::parse_with_params(&base, &[("q", query), ("format", "json")])
        } else {
            Url::parse_with_params(&base, &[("q", query)])
        };
        parsed.map_err(|e| upstream(format!("invalid search URL {base}: {e}")))
    }

    /// Runs one endpoint variant. `Ok` carries the filtered results, which
    /// may be empty.
    async fn try_variant(&self, url: Url) -> Result<Vec<SearchResult>, ScoutError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(upstream(format!("HTTP {status}")));
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !content_type.contains("json") {
            return Err(ScoutError::Parse(format!(
                "expected JSON, got content type {content_type:?}"
            )));
        }

        let body: SearxResponse = response
            .json()
            .await
            .map_err(|e| ScoutError::Parse(format!("invalid search response: {e}")))?;
        Ok(body
            .results
            .into_iter()
            .filter_map(SearxResult::into_result)
            .collect())
    }

    async fn search_variants(
        &self,
        query: &str,
        count: usize,
    ) -> Result<Vec<SearchResult>, ScoutError> {
        let mut last_error = None;
        let mut answered_empty = false;

        for (path, with_format) in VARIANTS {
            let url = self.variant_url(path, *with_format, query)?;
            match self.try_variant(url).await {
                Ok(results) if !results.is_empty() => {
                    debug!(query, path, count = results.len(), "search variant succeeded");
                    return Ok(results.into_iter().take(count).collect());
                }
                Ok(_) => answered_empty = true,
                Err(e) => {
                    debug!(query, path, error = %e, "search variant failed");
                    last_error = Some(e);
                }
            }
        }

        if answered_empty {
            return Ok(Vec::new());
        }
        Err(last_error.unwrap_or_else(|| upstream("no endpoint variant answered")))
    }
}

#[async_trait]
impl PluginAdapter for SearxngBackend {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn health_check(&self) -> Result<HealthStatus, ScoutError> {
        match self
            .client
            .get(format!("{}/healthz", self.base_url))
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(resp) => Ok(HealthStatus::Degraded(format!("HTTP {}", resp.status()))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl SearchBackend for SearxngBackend {
    async fn search(
        &self,
        query: &str,
        count: usize,
        timeout: Duration,
    ) -> Result<Vec<SearchResult>, ScoutError> {
        with_timeout("web search", timeout, self.search_variants(query, count)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn results_body() -> serde_json::Value {
        json!({
            "results": [
                {"title": "Paris weather", "url": "https://weather.example/paris", "content": "Sunny"},
                {"title": "", "url": "https://blank.example"},
                {"title": "Relative", "url": "/local/path"},
                {"title": "Forecast", "url": "http://forecast.example/paris"}
            ]
        })
    }

    #[tokio::test]
    async fn first_variant_with_results_wins() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "paris weather"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(results_body()))
            .expect(1)
            .mount(&server)
            .await;

        let backend = SearxngBackend::new(&server.uri()).unwrap();
        let results = backend
            .search("paris weather", 5, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Paris weather");
        assert_eq!(results[0].snippet, "Sunny");
        assert_eq!(results[1].url, "http://forecast.example/paris");
    }

    #[tokio::test]
    async fn falls_through_html_and_errors_to_later_variant() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(results_body()))
            .mount(&server)
            .await;

        let backend = SearxngBackend::new(&server.uri()).unwrap();
        let results = backend.search("q", 1, Duration::from_secs(2)).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn empty_json_is_ok_but_total_failure_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;
        let backend = SearxngBackend::new(&server.uri()).unwrap();
        let results = backend.search("q", 5, Duration::from_secs(2)).await.unwrap();
        assert!(results.is_empty());

        let dead = SearxngBackend::new("http://127.0.0.1:9").unwrap();
        let err = dead.search("q", 5, Duration::from_secs(2)).await.unwrap_err();
        assert!(matches!(err, ScoutError::Upstream { .. }));
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(results_body())
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;
        let backend = SearxngBackend::new(&server.uri()).unwrap();
        let err = backend
            .search("q", 5, Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }
}
