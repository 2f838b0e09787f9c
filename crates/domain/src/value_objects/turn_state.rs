//! Transient state of the turn currently being driven

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the live turn of a conversation currently stands
///
/// Exactly one state is live per conversation. The three `Awaiting*` states
/// mean a turn is in flight and no other turn may start.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum TurnState {
    /// No turn in flight
    #[default]
    Idle,
    /// Waiting on the completion service
    AwaitingCompletion,
    /// Waiting on the transcription service
    AwaitingTranscription,
    /// Waiting on the synthesis service (or playback)
    AwaitingSynthesis,
    /// The last turn stopped at a failure; holds the user-visible message
    Error(String),
}

impl TurnState {
    /// Whether a turn is in flight
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::AwaitingCompletion | Self::AwaitingTranscription | Self::AwaitingSynthesis
        )
    }

    /// Whether the last turn failed
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The error message, if the last turn failed
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::AwaitingCompletion => write!(f, "awaiting completion"),
            Self::AwaitingTranscription => write!(f, "awaiting transcription"),
            Self::AwaitingSynthesis => write!(f, "awaiting synthesis"),
            Self::Error(message) => write!(f, "error: {message}"),
        }
    }
}
