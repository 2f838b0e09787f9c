//! Message origin and modality

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Who produced a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageOrigin {
    /// Typed or spoken by the user
    User,
    /// Returned by the completion service
    Assistant,
}

impl MessageOrigin {
    /// Role name used when replaying history to a chat-completion API
    #[must_use]
    pub const fn role(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.role())
    }
}

/// How a turn was conducted: typed text or recorded speech
///
/// Also used as the conversation mode picked when a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Typed input, text output
    #[default]
    Text,
    /// Recorded input, spoken output
    Voice,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Voice => write!(f, "voice"),
        }
    }
}

impl FromStr for Modality {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "voice" | "speech" => Ok(Self::Voice),
            other => Err(DomainError::UnknownModality(other.to_string())),
        }
    }
}
