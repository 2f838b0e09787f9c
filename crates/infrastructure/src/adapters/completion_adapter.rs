//! Completion adapter - Implements CompletionPort using ai_core

use ai_core::{
    ChatMessage, CompletionConfig, CompletionEngine, CompletionError, CompletionRequest,
    OpenAICompletionEngine,
};
use application::{
    error::ApplicationError,
    ports::{CompletionPort, HistoryEntry},
};
use async_trait::async_trait;
use secrecy::SecretString;
use tracing::{debug, instrument, warn};

/// Adapter for OpenAI-compatible chat-completion services
#[derive(Debug)]
pub struct CompletionAdapter<E = OpenAICompletionEngine> {
    engine: E,
}

impl CompletionAdapter {
    /// Create a new adapter with the given configuration
    pub fn new(config: CompletionConfig) -> Result<Self, ApplicationError> {
        let engine = OpenAICompletionEngine::new(config)
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self { engine })
    }
}

impl<E: CompletionEngine> CompletionAdapter<E> {
    /// Wrap an existing engine
    pub const fn with_engine(engine: E) -> Self {
        Self { engine }
    }

    /// Convert ai_core error to application error
    fn map_error(e: CompletionError) -> ApplicationError {
        match e {
            CompletionError::Unauthorized(msg) => ApplicationError::Unauthorized(msg),
            CompletionError::ServerError { status, message } => {
                ApplicationError::service(status, message)
            },
            CompletionError::EmptyResponse => {
                ApplicationError::EmptyResponse("completion service".to_string())
            },
            CompletionError::Timeout(ms) => ApplicationError::Timeout(ms),
            CompletionError::ConnectionFailed(msg) | CompletionError::RequestFailed(msg) => {
                ApplicationError::service(0, msg)
            },
            CompletionError::InvalidResponse(msg) => {
                ApplicationError::service(200, format!("Invalid response: {msg}"))
            },
        }
    }
}

#[async_trait]
impl<E: CompletionEngine> CompletionPort for CompletionAdapter<E> {
    #[instrument(skip(self, history, credential), fields(history_len = history.len(), model = self.engine.default_model()))]
    async fn complete(
        &self,
        history: Vec<HistoryEntry>,
        credential: &SecretString,
    ) -> Result<String, ApplicationError> {
        let messages = history
            .into_iter()
            .map(|entry| ChatMessage::new(entry.role, entry.content))
            .collect();

        let response = self
            .engine
            .complete(CompletionRequest::from_history(messages), credential)
            .await
            .map_err(|e| {
                warn!(error = %e, "Completion request failed");
                Self::map_error(e)
            })?;

        debug!(
            response_len = response.content.len(),
            finish_reason = ?response.finish_reason,
            "Completion received"
        );

        Ok(response.content)
    }
}
