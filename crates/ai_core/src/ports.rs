//! Port definitions for the completion client
//!
//! Defines the trait that completion backends implement.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::CompletionError;

/// One message in a completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user" or "assistant"
    pub role: String,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a message with the given role
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Request for a completion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Ordered history, oldest first
    pub messages: Vec<ChatMessage>,
    /// Model to use (overrides config default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Temperature for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Create a request over an existing history
    pub fn from_history(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Set the model for this request
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set temperature
    #[must_use]
    pub const fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// Response from a completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Content of the first choice
    pub content: String,
    /// Model that generated the response
    pub model: String,
    /// Token usage statistics
    pub usage: Option<TokenUsage>,
    /// Finish reason of the first choice
    pub finish_reason: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Port for completion backends
#[async_trait]
pub trait CompletionEngine: Send + Sync {
    /// Generate the next assistant message
    async fn complete(
        &self,
        request: CompletionRequest,
        api_key: &SecretString,
    ) -> Result<CompletionResponse, CompletionError>;

    /// The model used when a request names none
    fn default_model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_from_history() {
        let req = CompletionRequest::from_history(vec![
            ChatMessage::new("user", "Hello"),
            ChatMessage::new("assistant", "Hi"),
        ]);
        assert_eq!(req.messages.len(), 2);
        assert!(req.model.is_none());
        assert!(req.temperature.is_none());
    }

    #[test]
    fn request_builders() {
        let req = CompletionRequest::default()
            .with_model("gpt-4o")
            .with_temperature(0.1);
        assert_eq!(req.model.as_deref(), Some("gpt-4o"));
        assert_eq!(req.temperature, Some(0.1));
    }

    #[test]
    fn request_serialization_skips_unset_fields() {
        let req = CompletionRequest::from_history(vec![ChatMessage::new("user", "Hi")]);
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("model").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
