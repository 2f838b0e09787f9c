//! Completion port - Interface for the chat-completion service

use async_trait::async_trait;
use domain::ConversationMessage;
#[cfg(test)]
use mockall::automock;
use secrecy::SecretString;
use serde::Serialize;

use crate::error::ApplicationError;

/// One history item as the completion service sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// `"user"` or `"assistant"`
    pub role: &'static str,
    /// Message text
    pub content: String,
}

impl HistoryEntry {
    /// Map an ordered message list onto role/content pairs
    pub fn from_messages(messages: &[ConversationMessage]) -> Vec<Self> {
        messages.iter().map(Self::from).collect()
    }
}

impl From<&ConversationMessage> for HistoryEntry {
    fn from(message: &ConversationMessage) -> Self {
        Self {
            role: message.role(),
            content: message.content.clone(),
        }
    }
}

/// Port for chat-completion requests
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Produce the next assistant message for the given history
    ///
    /// # Arguments
    /// * `history` - The full conversation, oldest first
    /// * `credential` - API key for the completion service
    ///
    /// # Returns
    /// The content of the first choice
    async fn complete(
        &self,
        history: Vec<HistoryEntry>,
        credential: &SecretString,
    ) -> Result<String, ApplicationError>;
}
