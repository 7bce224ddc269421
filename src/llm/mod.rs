//! Language-model capability used by the map and reduce stages.
//!
//! The pipeline only sees [`ChatClient`]: a request carries a model identifier, role-tagged
//! messages and an output budget, and the response is the generated text. The production adapter
//! talks to Groq's OpenAI-compatible chat completions endpoint over `reqwest`; tests plug in stub
//! clients that return canned text.

use crate::config::Config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced while calling the language-model capability.
#[derive(Debug, Error)]
pub enum ChatClientError {
    /// No credential was configured for the provider.
    #[error("GROQ_API_KEY is not set; cannot call the language model")]
    MissingCredential,
    /// Provider could not be reached or the request timed out.
    #[error("Language model unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Language model request failed: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed language model response: {0}")]
    InvalidResponse(String),
}

/// Role attached to a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instruction that frames the request.
    System,
    /// Content supplied on behalf of the user.
    User,
}

/// Single role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Role of the message author.
    pub role: MessageRole,
    /// Message body.
    pub content: String,
}

impl ChatMessage {
    /// Build a message with the given role.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Request payload passed to the language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// Model identifier understood by the provider.
    pub model: String,
    /// Ordered conversation sent to the model.
    pub messages: Vec<ChatMessage>,
    /// Maximum number of tokens the model may generate.
    pub max_tokens: u32,
}

impl ChatRequest {
    /// Build the two-message request used by every pipeline stage.
    pub fn system_and_user(
        model: impl Into<String>,
        system: impl Into<String>,
        user: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![
                ChatMessage::new(MessageRole::System, system),
                ChatMessage::new(MessageRole::User, user),
            ],
            max_tokens,
        }
    }
}

/// Interface implemented by language-model backends.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send one chat request and return the generated text, trimmed.
    async fn complete(&self, request: ChatRequest) -> Result<String, ChatClientError>;
}

/// Build the production client from configuration.
pub fn build_chat_client(config: &Config) -> Result<Arc<dyn ChatClient>, ChatClientError> {
    let client = GroqClient::new(
        config.groq_api_key.clone(),
        config.groq_base_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;
    Ok(Arc::new(client))
}

/// Client for Groq's OpenAI-compatible chat completions API.
pub struct GroqClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl GroqClient {
    /// Construct a client with a process-wide request timeout.
    pub fn new(
        api_key: Option<String>,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, ChatClientError> {
        let http = Client::builder()
            .user_agent("docsum/0.1")
            .timeout(timeout)
            .build()
            .map_err(|error| {
                ChatClientError::ProviderUnavailable(format!(
                    "failed to construct HTTP client: {error}"
                ))
            })?;
        Ok(Self {
            http,
            base_url,
            api_key,
            timeout,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ChatClient for GroqClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, ChatClientError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ChatClientError::MissingCredential)?;

        tracing::debug!(
            model = %request.model,
            max_tokens = request.max_tokens,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    ChatClientError::ProviderUnavailable(format!(
                        "request to {} timed out after {}s",
                        self.base_url,
                        self.timeout.as_secs()
                    ))
                } else {
                    ChatClientError::ProviderUnavailable(format!(
                        "failed to reach {}: {error}",
                        self.base_url
                    ))
                }
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ChatClientError::ProviderUnavailable(format!(
                "endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatClientError::GenerationFailed(format!(
                "provider returned {status}: {body}"
            )));
        }

        let body: CompletionResponse = response.json().await.map_err(|error| {
            ChatClientError::InvalidResponse(format!("failed to decode completion: {error}"))
        })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ChatClientError::InvalidResponse("response had no choices".into()))?;

        Ok(content.trim().to_string())
    }
}
