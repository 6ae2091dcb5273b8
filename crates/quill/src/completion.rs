//! Chat completion client
//!
//! [`CompletionClient`] is the seam between request handling and the outside
//! world. [`OpenAiClient`] is the production implementation; tests swap in
//! stubs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// OpenAI API root used when none is configured
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Errors from a completion call
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The request could not be sent or the connection failed
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The request did not finish within the configured deadline
    #[error("completion request timed out")]
    Timeout,
    /// The API answered with a non-success status
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },
    /// The response body was not a completion response
    #[error("failed to decode completion response: {0}")]
    Decode(#[from] serde_json::Error),
    /// The response contained no choices
    #[error("completion response contained no choices")]
    EmptyChoices,
}

/// Something that turns a prompt into generated text.
///
/// Implementations must be shareable across concurrently running requests.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `prompt` as a single user message and return the generated text.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Pull the text of the first choice out of a completion response.
fn first_choice_text(response: ChatCompletionResponse) -> Result<String, CompletionError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.unwrap_or_default())
        .ok_or(CompletionError::EmptyChoices)
}

/// Completion client for OpenAI-compatible `/chat/completions` endpoints.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Build a client from loaded configuration.
    ///
    /// The configured timeout bounds each outbound request end to end.
    pub fn new(config: &Config) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            url: format!("{}/chat/completions", config.base_url),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// The model this client asks for.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(model = %self.model, url = %self.url, "Sending chat completion request");

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let body = response.text().await.map_err(classify)?;

        if !status.is_success() {
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = serde_json::from_str(&body)?;
        let text = first_choice_text(completion)?;

        tracing::debug!(response_length = text.len(), "Received chat completion");
        Ok(text)
    }
}

fn classify(err: reqwest::Error) -> CompletionError {
    if err.is_timeout() {
        CompletionError::Timeout
    } else {
        CompletionError::Transport(err)
    }
}
