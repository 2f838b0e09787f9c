//! AI Core - Chat-completion client
//!
//! Provides the [`CompletionEngine`] abstraction and a client for
//! OpenAI-compatible `chat/completions` endpoints.

pub mod config;
pub mod error;
pub mod openai;
pub mod ports;

pub use config::CompletionConfig;
pub use error::CompletionError;
pub use openai::OpenAICompletionEngine;
pub use ports::{ChatMessage, CompletionEngine, CompletionRequest, CompletionResponse, TokenUsage};
