//! Hugging Face embedding provider using the Inference API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{Result, RetrievalError};

/// Base URL for the Hugging Face feature-extraction pipeline.
const HF_FEATURE_EXTRACTION_URL: &str =
    "https://api-inference.huggingface.co/pipeline/feature-extraction";

/// The default sentence-embedding model.
const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// The dimensionality of `all-MiniLM-L6-v2` embeddings.
const DEFAULT_DIMENSIONS: usize = 384;

/// An [`EmbeddingProvider`] backed by the Hugging Face Inference API.
///
/// Uses `reqwest` to call the feature-extraction pipeline directly.
///
/// # Configuration
///
/// - `model` – defaults to `sentence-transformers/all-MiniLM-L6-v2`.
/// - `dimensions` – must match the chosen model; defaults to 384.
/// - `api_token` – from the constructor or the `HF_API_TOKEN` environment
///   variable.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_retrieval::hf::HfEmbeddingProvider;
///
/// let provider = HfEmbeddingProvider::new("hf_...")?;
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct HfEmbeddingProvider {
    client: reqwest::Client,
    api_token: String,
    model: String,
    dimensions: usize,
}

impl HfEmbeddingProvider {
    /// Create a new provider with the given API token.
    ///
    /// Uses the default model (`all-MiniLM-L6-v2`, 384 dimensions).
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(RetrievalError::Embedding {
                provider: "HuggingFace".into(),
                message: "API token must not be empty".into(),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_token,
            model: DEFAULT_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Create a new provider using the `HF_API_TOKEN` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_token = std::env::var("HF_API_TOKEN").map_err(|_| RetrievalError::Embedding {
            provider: "HuggingFace".into(),
            message: "HF_API_TOKEN environment variable not set".into(),
        })?;
        Self::new(api_token)
    }

    /// Set the model ID (e.g. `sentence-transformers/all-mpnet-base-v2`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the expected output dimensionality for the chosen model.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }
}

// ── Inference API request/response types ───────────────────────────

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: Vec<&'a str>,
    options: RequestOptions,
}

#[derive(Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for HfEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "HuggingFace", text_len = text.len(), "embedding single text");

        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| RetrievalError::Embedding {
            provider: "HuggingFace".into(),
            message: "API returned empty response".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "HuggingFace",
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let url = format!("{HF_FEATURE_EXTRACTION_URL}/{}", self.model);
        let request_body = FeatureExtractionRequest {
            inputs: texts.to_vec(),
            options: RequestOptions { wait_for_model: true },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "HuggingFace", error = %e, "request failed");
                RetrievalError::Embedding {
                    provider: "HuggingFace".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail =
                serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error).unwrap_or(body);

            error!(provider = "HuggingFace", %status, "API error");
            return Err(RetrievalError::Embedding {
                provider: "HuggingFace".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let embeddings: Vec<Vec<f32>> = response.json().await.map_err(|e| {
            error!(provider = "HuggingFace", error = %e, "failed to parse response");
            RetrievalError::Embedding {
                provider: "HuggingFace".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        // The pipeline returns one vector per input; anything else is a
        // malformed response and must not reach the index.
        if embeddings.len() != texts.len() {
            return Err(RetrievalError::Embedding {
                provider: "HuggingFace".into(),
                message: format!(
                    "expected {} embeddings, API returned {}",
                    texts.len(),
                    embeddings.len()
                ),
            });
        }
        for embedding in &embeddings {
            if embedding.len() != self.dimensions {
                return Err(RetrievalError::Embedding {
                    provider: "HuggingFace".into(),
                    message: format!(
                        "expected {}-dimensional embeddings, API returned {}",
                        self.dimensions,
                        embedding.len()
                    ),
                });
            }
        }

        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
