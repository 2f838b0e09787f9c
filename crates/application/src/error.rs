//! Application-level errors

use domain::{CredentialKind, DomainError};
use thiserror::Error;

/// Errors that can occur in the application layer
///
/// Every variant ends the current turn. None of them is retried.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The user submitted blank text or an empty recording
    #[error("Input is empty")]
    EmptyInput,

    /// A credential required for this turn has not been stored
    #[error("Missing credential: {}", .0.label())]
    MissingCredential(CredentialKind),

    /// The remote service rejected the credential
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The remote service answered with an error status, or could not be reached (status 0)
    #[error("Service error {status}: {message}")]
    ServiceError {
        /// HTTP status code, `0` when no response was received
        status: u16,
        /// Error message from the service or the transport
        message: String,
    },

    /// The remote service answered successfully but without usable content
    #[error("Empty response from {0}")]
    EmptyResponse(String),

    /// An external call did not finish in time
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// Another turn is still in flight
    #[error("A turn is already in progress")]
    TurnInProgress,

    /// Synthesized audio could not be played back
    #[error("Playback failed: {0}")]
    Playback(String),

    /// Credential storage failed
    #[error("Credential storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Build a service error from a status code and message
    pub fn service(status: u16, message: impl Into<String>) -> Self {
        Self::ServiceError {
            status,
            message: message.into(),
        }
    }

    /// Text shown to the user when a turn ends with this error
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyInput => "Please enter a message first.".to_string(),
            Self::MissingCredential(kind) => {
                format!("The {} is not set. Add it before starting a turn.", kind.label())
            },
            Self::Unauthorized(message) => {
                format!("The service rejected the API key: {message}")
            },
            Self::ServiceError { status: 0, message } => {
                format!("Could not reach the service: {message}")
            },
            Self::ServiceError { status, message } => {
                format!("API error: {status} {message}")
            },
            Self::Timeout(ms) => {
                format!("The service did not answer within {} seconds.", ms / 1000)
            },
            other => other.to_string(),
        }
    }

    /// Whether this error was raised before any external call was made
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput | Self::MissingCredential(_) | Self::TurnInProgress
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(ApplicationError::EmptyInput.to_string(), "Input is empty");
        assert_eq!(
            ApplicationError::MissingCredential(CredentialKind::Speech).to_string(),
            "Missing credential: speech service key"
        );
        assert_eq!(
            ApplicationError::service(500, "boom").to_string(),
            "Service error 500: boom"
        );
        assert_eq!(
            ApplicationError::EmptyResponse("completion service".to_string()).to_string(),
            "Empty response from completion service"
        );
    }

    #[test]
    fn user_message_for_service_error_mirrors_status() {
        let err = ApplicationError::service(429, "Rate limit reached");
        assert_eq!(err.user_message(), "API error: 429 Rate limit reached");
    }

    #[test]
    fn user_message_for_transport_failure() {
        let err = ApplicationError::service(0, "connection refused");
        assert!(err.user_message().starts_with("Could not reach the service"));
    }

    #[test]
    fn user_message_for_timeout_in_seconds() {
        assert_eq!(
            ApplicationError::Timeout(30_000).user_message(),
            "The service did not answer within 30 seconds."
        );
    }

    #[test]
    fn user_message_falls_back_to_display() {
        let err = ApplicationError::Playback("no player".to_string());
        assert_eq!(err.user_message(), err.to_string());
    }

    #[test]
    fn precondition_errors() {
        assert!(ApplicationError::EmptyInput.is_precondition());
        assert!(ApplicationError::MissingCredential(CredentialKind::Completion).is_precondition());
        assert!(ApplicationError::TurnInProgress.is_precondition());
        assert!(!ApplicationError::Timeout(1).is_precondition());
    }

    #[test]
    fn domain_error_converts() {
        let err: ApplicationError = DomainError::UnknownCredential("x".to_string()).into();
        assert!(matches!(err, ApplicationError::Domain(_)));
    }
}
