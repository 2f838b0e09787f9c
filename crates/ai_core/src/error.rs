//! Completion errors

use thiserror::Error;

/// Errors that can occur during a completion request
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Failed to connect to the API
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request could not be sent or its body not read
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The API rejected the key (401/403)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The API answered with a non-success status
    #[error("Server error {status}: {message}")]
    ServerError {
        /// HTTP status code
        status: u16,
        /// Error message extracted from the body
        message: String,
    },

    /// The response held no choices, or the first choice had no content
    #[error("Empty response from completion API")]
    EmptyResponse,

    /// Response parsing failed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request timed out
    #[error("Completion timeout after {0}ms")]
    Timeout(u64),
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(30_000)
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}
