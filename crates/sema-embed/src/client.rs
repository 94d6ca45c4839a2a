//! HTTP embedding client (Ollama-compatible API).

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use sema_config::EmbeddingConfig;
use sema_core::{EmbedError, EmbeddingGenerator};

use crate::types::{EmbeddingRequest, EmbeddingResponse};

/// Client for an Ollama-compatible embedding server.
///
/// Built once per process and shared across requests; reqwest clients are
/// internally connection-pooled and safe to call concurrently.
#[derive(Clone)]
pub struct HttpEmbedder {
    client: Client,
    host: String,
    model: String,
    dimension: usize,
    timeout: Duration,
}

impl HttpEmbedder {
    /// Create a client from configuration.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, EmbedError> {
        Self::new(
            &config.host,
            &config.model,
            config.dimension,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// Create a client with explicit settings.
    pub fn new(
        host: impl Into<String>,
        model: impl Into<String>,
        dimension: usize,
        timeout: Duration,
    ) -> Result<Self, EmbedError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbedError::Backend(e.to_string()))?;

        let host = host.into();
        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            model: model.into(),
            dimension,
            timeout,
        })
    }

    fn map_request_error(&self, e: reqwest::Error) -> EmbedError {
        if e.is_connect() {
            EmbedError::Connection(format!("embedding server unreachable at {}", self.host))
        } else if e.is_timeout() {
            EmbedError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            EmbedError::Backend(e.to_string())
        }
    }
}

#[async_trait]
impl EmbeddingGenerator for HttpEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if text.trim().is_empty() {
            return Err(EmbedError::EmptyInput);
        }

        let url = format!("{}/api/embeddings", self.host);
        debug!(
            "Embedding {} character(s) with model {}",
            text.len(),
            self.model
        );

        let request = EmbeddingRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 404 || body.contains("not found") {
                return Err(EmbedError::ModelNotFound {
                    model: self.model.clone(),
                });
            }

            return Err(EmbedError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let embedding_response: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbedError::Backend(format!("invalid embedding response: {}", e)))?;

        let vector = embedding_response.embedding;
        if vector.len() != self.dimension {
            return Err(EmbedError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        Ok(vector)
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.host);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}
