//! Answer generation against a remote chat-completion model.
//!
//! The generator is an external collaborator of the retrieval core: it takes
//! retrieved context plus the user's question and returns an answer string.
//! Its failures surface to the user and never touch the retrieval index.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

/// Default chat-completions endpoint (Together's OpenAI-compatible API).
const TOGETHER_CHAT_URL: &str = "https://api.together.xyz/v1/chat/completions";

/// Default chat model.
const DEFAULT_MODEL: &str = "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo";

/// Response length cap, in tokens.
const DEFAULT_MAX_TOKENS: u32 = 500;

/// An answer-generation failure.
#[derive(Debug, Error)]
#[error("Answer generation failed ({provider}): {message}")]
pub struct AnswerError {
    pub provider: String,
    pub message: String,
}

/// Produces an answer from retrieved context and a question.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generate an answer grounded in `context`. An empty `context` asks the
    /// model to answer from general knowledge.
    async fn answer(&self, context: &str, question: &str) -> Result<String, AnswerError>;
}

/// Render the prompt sent to the chat model.
fn render_prompt(context: &str, question: &str) -> String {
    format!("Here's some context: {context}\nAnswer this question: {question}")
}

/// An [`AnswerGenerator`] backed by an OpenAI-compatible chat-completions
/// endpoint (Together by default).
///
/// # Example
///
/// ```rust,ignore
/// use docqa_chat::answer::TogetherGenerator;
///
/// let generator = TogetherGenerator::from_env()?;
/// let answer = generator.answer(context, "How do I rotate a key?").await?;
/// ```
pub struct TogetherGenerator {
    client: reqwest::Client,
    api_key: String,
    url: String,
    model: String,
    max_tokens: u32,
}

impl TogetherGenerator {
    /// Create a new generator with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, AnswerError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(AnswerError {
                provider: "Together".into(),
                message: "API key must not be empty".into(),
            });
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            url: TOGETHER_CHAT_URL.into(),
            model: DEFAULT_MODEL.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Create a new generator using the `TOGETHER_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, AnswerError> {
        let api_key = std::env::var("TOGETHER_API_KEY").map_err(|_| AnswerError {
            provider: "Together".into(),
            message: "TOGETHER_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Set the chat model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point at a different OpenAI-compatible chat-completions endpoint.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

// ── Chat-completions wire types ────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl AnswerGenerator for TogetherGenerator {
    async fn answer(&self, context: &str, question: &str) -> Result<String, AnswerError> {
        let prompt = render_prompt(context, question);
        debug!(model = %self.model, prompt_len = prompt.len(), "requesting answer");

        let request_body = ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![ChatMessage { role: "user", content: &prompt }],
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Together", error = %e, "request failed");
                AnswerError { provider: "Together".into(), message: format!("request failed: {e}") }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(provider = "Together", %status, "API error");
            return Err(AnswerError {
                provider: "Together".into(),
                message: format!("API returned {status}: {body}"),
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| AnswerError {
            provider: "Together".into(),
            message: format!("failed to parse response: {e}"),
        })?;

        chat_response.choices.into_iter().next().map(|c| c.message.content).ok_or_else(|| {
            AnswerError {
                provider: "Together".into(),
                message: "API returned no choices".into(),
            }
        })
    }
}
