//! Credential names

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// The API credentials the client knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    /// Key for the chat-completion service
    Completion,
    /// Key for the speech (transcription and synthesis) service
    Speech,
}

impl CredentialKind {
    /// Every known credential, in storage order
    pub const ALL: [Self; 2] = [Self::Completion, Self::Speech];

    /// Name under which the credential is persisted
    #[must_use]
    pub const fn storage_key(&self) -> &'static str {
        match self {
            Self::Completion => "completion_api_key",
            Self::Speech => "speech_api_key",
        }
    }

    /// Human-readable label for prompts and status output
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Completion => "completion service key",
            Self::Speech => "speech service key",
        }
    }

    /// Look a credential up by its persisted name
    #[must_use]
    pub fn from_storage_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.storage_key() == key)
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completion => write!(f, "completion"),
            Self::Speech => write!(f, "speech"),
        }
    }
}

impl FromStr for CredentialKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "completion" | "openai" | "chat" => Ok(Self::Completion),
            "speech" | "voice" => Ok(Self::Speech),
            other => Self::from_storage_key(other)
                .ok_or_else(|| DomainError::UnknownCredential(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_keys_are_distinct() {
        assert_ne!(
            CredentialKind::Completion.storage_key(),
            CredentialKind::Speech.storage_key()
        );
    }

    #[test]
    fn storage_key_roundtrip() {
        for kind in CredentialKind::ALL {
            assert_eq!(CredentialKind::from_storage_key(kind.storage_key()), Some(kind));
        }
    }

    #[test]
    fn parses_aliases() {
        assert_eq!("openai".parse::<CredentialKind>().unwrap(), CredentialKind::Completion);
        assert_eq!("Speech".parse::<CredentialKind>().unwrap(), CredentialKind::Speech);
        assert_eq!(
            "speech_api_key".parse::<CredentialKind>().unwrap(),
            CredentialKind::Speech
        );
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(matches!(
            "github".parse::<CredentialKind>(),
            Err(DomainError::UnknownCredential(_))
        ));
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&CredentialKind::Completion).unwrap();
        assert_eq!(json, "\"completion\"");
    }
}
