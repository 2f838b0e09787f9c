//! OpenAI-compatible chat-completion client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::CompletionConfig,
    error::CompletionError,
    ports::{ChatMessage, CompletionEngine, CompletionRequest, CompletionResponse, TokenUsage},
};

/// Completion engine for `POST {base_url}/chat/completions`
#[derive(Debug)]
pub struct OpenAICompletionEngine {
    client: Client,
    config: CompletionConfig,
}

impl OpenAICompletionEngine {
    /// Create a new completion engine
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| CompletionError::ConnectionFailed(e.to_string()))?;

        info!(
            base_url = %config.base_url,
            model = %config.model,
            "Initialized completion engine"
        );

        Ok(Self { client, config })
    }

    /// The active configuration
    pub const fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn resolve_model<'a>(&'a self, request: &'a CompletionRequest) -> &'a str {
        request.model.as_deref().unwrap_or(&self.config.model)
    }

    fn map_send_error(&self, err: reqwest::Error) -> CompletionError {
        if err.is_timeout() {
            CompletionError::Timeout(self.config.timeout_ms)
        } else {
            CompletionError::from(err)
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pull the `error.message` field out of an error body, falling back to the raw text
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .ok()
        .filter(|message| !message.trim().is_empty())
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string())
}

#[async_trait]
impl CompletionEngine for OpenAICompletionEngine {
    #[instrument(skip(self, request, api_key), fields(
        model = %self.resolve_model(&request),
        messages = request.messages.len()
    ))]
    async fn complete(
        &self,
        request: CompletionRequest,
        api_key: &SecretString,
    ) -> Result<CompletionResponse, CompletionError> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &self.config.system_prompt {
            messages.push(ChatMessage::new("system", system.clone()));
        }
        messages.extend(request.messages.iter().cloned());

        let body = ChatCompletionRequest {
            model: self.resolve_model(&request),
            messages,
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: request.temperature.unwrap_or(self.config.temperature),
        };

        debug!("Sending chat completion request");

        let response = self
            .client
            .post(self.api_url("chat/completions"))
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(status, &text);
            warn!(status = %status, message = %message, "Completion request failed");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    CompletionError::Unauthorized(message)
                },
                _ => CompletionError::ServerError {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(CompletionError::EmptyResponse)?;
        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)?;

        let usage = parsed.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        debug!(tokens = ?usage, "Completion finished");

        Ok(CompletionResponse {
            content,
            model: parsed.model.unwrap_or_else(|| body.model.to_string()),
            usage,
            finish_reason: choice.finish_reason,
        })
    }

    fn default_model(&self) -> &str {
        &self.config.model
    }
}
