//! # Embedding Provider
//!
//! Embedding generation is an external collaborator: the pipeline only needs
//! `text -> float vector`. The shipped [`HttpEmbeddingProvider`] calls an
//! OpenAI-compatible `/v1/embeddings` endpoint; tests substitute a mock.

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Custom error types for embedding generation.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Failed to build Reqwest client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("Failed to send request to embeddings API: {0}")]
    Request(reqwest::Error),
    #[error("Failed to deserialize embeddings API response: {0}")]
    Deserialization(reqwest::Error),
    #[error("Embeddings API returned an error: {0}")]
    Api(String),
}

/// Collaborator contract: text in, fixed-length float vector out.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, input: &str) -> Result<Vec<f32>, EmbeddingError>;
}

#[derive(Serialize, Debug)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize, Debug)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize, Debug)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Generates embeddings by calling an external, OpenAI-compatible API.
pub struct HttpEmbeddingProvider {
    client: ReqwestClient,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpEmbeddingProvider {
    pub fn new(
        api_url: String,
        model: String,
        api_key: Option<String>,
    ) -> Result<Self, EmbeddingError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(EmbeddingError::ClientBuild)?;
        Ok(Self {
            client,
            api_url,
            model,
            api_key,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, input: &str) -> Result<Vec<f32>, EmbeddingError> {
        debug!(model = %self.model, "Requesting embedding");
        let mut request = self.client.post(&self.api_url).json(&EmbeddingRequest {
            model: &self.model,
            input,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(EmbeddingError::Request)?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!(
                "embeddings API returned status {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(EmbeddingError::Deserialization)?;
        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::Api("embeddings API returned no data".to_string()))?;
        Ok(embedding)
    }
}
