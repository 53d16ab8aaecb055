//! Chat-completion provider abstraction.
//!
//! [`ChatProvider`] is the seam the [`Advisor`](crate::advisor::Advisor)
//! talks to; [`OpenAiChat`] implements it against an OpenAI-compatible
//! `POST /chat/completions` endpoint. Calls are made once with no retry: a
//! failed completion is reported to the caller, which decides how to degrade.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::ChatConfig;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("OPENAI_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("chat API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("chat request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat response contained no message content")]
    EmptyResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One completion request: model, role-tagged messages and temperature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Run one completion and return the first choice's message text.
    async fn complete(&self, request: &ChatRequest) -> Result<String, ChatError>;
}

pub struct OpenAiChat {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiChat {
    pub fn new(config: &ChatConfig, api_key: impl Into<String>) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build from configuration, reading the key from `OPENAI_API_KEY`.
    pub fn from_env(config: &ChatConfig) -> Result<Self, ChatError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| ChatError::MissingApiKey)?;
        Self::new(config, api_key)
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl ChatProvider for OpenAiChat {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ChatError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %request.model, messages = request.messages.len(), "chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ChatError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_in_openai_shape() {
        let request = ChatRequest {
            model: "gpt-4o".to_string(),
            messages: vec![Message::system("persona"), Message::user("question")],
            temperature: 0.5,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-4o",
                "messages": [
                    { "role": "system", "content": "persona" },
                    { "role": "user", "content": "question" }
                ],
                "temperature": 0.5
            })
        );
    }
}
