//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Audio format could not be recognised
    #[error("Unsupported audio format: {0}")]
    UnsupportedAudioFormat(String),

    /// Unknown credential name
    #[error("Unknown credential: {0}")]
    UnknownCredential(String),

    /// Unknown conversation modality
    #[error("Unknown modality: {0}")]
    UnknownModality(String),
}
