// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Ollama API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use scout_config::model::GenerationConfig;
use scout_core::{
    ChatMessage, ChatRequest, ChunkStream, CompletionRequest, EmbeddingOutput, EmbeddingRequest,
    GenerationBackend, HealthStatus, PluginAdapter, ScoutError, with_timeout,
};

use crate::stream::parse_ndjson_stream;
use crate::types::{
    ChatBody, ChatResponse, EmbedBody, EmbedResponse, ErrorBody, GenerateBody, GenerateResponse,
    LegacyEmbedBody, LegacyEmbedResponse, Options,
};

const SERVICE: &str = "ollama";

/// Generation backend speaking the Ollama HTTP API.
///
/// No call is retried; a failure is reported to the calling phase, which
/// decides how to degrade.
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaBackend {
    /// Creates a backend for the Ollama instance at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, ScoutError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ScoutError::Upstream {
                service: SERVICE.into(),
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a backend from the `[generation]` config section.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, ScoutError> {
        Self::new(&config.base_url)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ScoutError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(request_err)?;

        let status = response.status();
        debug!(path, status = %status, "ollama response received");
        if status.is_success() {
            return Ok(response);
        }
        Err(status_err(status, response).await)
    }

    async fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ScoutError> {
        let response = self.send(path, body).await?;
        response
            .json::<R>()
            .await
            .map_err(|e| ScoutError::Parse(format!("invalid {path} response: {e}")))
    }

    async fn embed_legacy(&self, request: &EmbeddingRequest) -> Result<Vec<Vec<f32>>, ScoutError> {
        let mut embeddings = Vec::with_capacity(request.inputs.len());
        for input in &request.inputs {
            let body = LegacyEmbedBody {
                model: &request.model,
                prompt: input,
            };
            let resp: LegacyEmbedResponse = self.post_json("/api/embeddings", &body).await?;
            embeddings.push(resp.embedding);
        }
        Ok(embeddings)
    }

    async fn embed_inner(&self, request: &EmbeddingRequest) -> Result<Vec<Vec<f32>>, ScoutError> {
        let body = EmbedBody {
            model: &request.model,
            input: &request.inputs,
        };
        let response = self
            .client
            .post(self.url("/api/embed"))
            .json(&body)
            .send()
            .await
            .map_err(request_err)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            // Servers older than the batch endpoint only know /api/embeddings.
            debug!("batch embed endpoint missing, using legacy endpoint");
            return self.embed_legacy(request).await;
        }
        if !status.is_success() {
            return Err(status_err(status, response).await);
        }

        let resp: EmbedResponse = response
            .json()
            .await
            .map_err(|e| ScoutError::Parse(format!("invalid /api/embed response: {e}")))?;
        Ok(resp.embeddings)
    }
}

fn request_err(e: reqwest::Error) -> ScoutError {
    ScoutError::Upstream {
        service: SERVICE.into(),
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

async fn status_err(status: StatusCode, response: reqwest::Response) -> ScoutError {
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or(body);
    warn!(status = %status, detail = %detail, "ollama request failed");
    ScoutError::upstream(SERVICE, format!("HTTP {status}: {detail}"))
}

#[async_trait]
impl PluginAdapter for OllamaBackend {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn health_check(&self) -> Result<HealthStatus, ScoutError> {
        let result = self
            .client
            .get(self.url("/api/tags"))
            .timeout(std::time::Duration::from_secs(5))
            .send()
            .await;

        Ok(match result {
            Ok(resp) if resp.status().is_success() => HealthStatus::Healthy,
            Ok(resp) => HealthStatus::Degraded(format!("HTTP {}", resp.status())),
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    async fn chat(&self, request: ChatRequest) -> Result<ChatMessage, ScoutError> {
        let body = ChatBody {
            model: &request.model,
            messages: &request.messages,
            stream: false,
            options: Options {
                temperature: request.temperature,
            },
        };
        let resp: ChatResponse =
            with_timeout("chat", request.timeout, self.post_json("/api/chat", &body)).await?;
        Ok(ChatMessage::assistant(resp.message.content))
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ChunkStream, ScoutError> {
        let body = ChatBody {
            model: &request.model,
            messages: &request.messages,
            stream: true,
            options: Options {
                temperature: request.temperature,
            },
        };
        let response =
            with_timeout("chat stream", request.timeout, self.send("/api/chat", &body)).await?;
        Ok(parse_ndjson_stream(response, request.timeout))
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, ScoutError> {
        let body = GenerateBody {
            model: &request.model,
            prompt: &request.prompt,
            system: request.system.as_deref(),
            stream: false,
            options: Options {
                temperature: request.temperature,
            },
        };
        let resp: GenerateResponse = with_timeout(
            "completion",
            request.timeout,
            self.post_json("/api/generate", &body),
        )
        .await?;
        Ok(resp.response)
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingOutput, ScoutError> {
        if request.inputs.is_empty() {
            return Ok(EmbeddingOutput {
                embeddings: Vec::new(),
                dimensions: 0,
            });
        }

        let embeddings = with_timeout("embed", request.timeout, self.embed_inner(&request)).await?;

        if embeddings.len() != request.inputs.len() {
            return Err(ScoutError::Embedding(format!(
                "expected {} embeddings, got {}",
                request.inputs.len(),
                embeddings.len()
            )));
        }
        let dimensions = embeddings.first().map_or(0, Vec::len);
        if dimensions == 0 || embeddings.iter().any(|e| e.len() != dimensions) {
            return Err(ScoutError::Embedding(
                "backend returned empty or ragged embeddings".into(),
            ));
        }

        Ok(EmbeddingOutput {
            embeddings,
            dimensions,
        })
    }
}
