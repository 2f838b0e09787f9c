//! Conversation message entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{MessageId, MessageOrigin, Modality};

/// One turn's worth of text in a conversation
///
/// Messages are created by [`crate::Conversation::append`] and never change
/// afterwards. For voice turns `content` is the transcript (user side) or the
/// text that was synthesized (assistant side).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Unique message identifier
    pub id: MessageId,
    /// Message text
    pub content: String,
    /// Who produced the message
    pub origin: MessageOrigin,
    /// When the message was appended
    pub created_at: DateTime<Utc>,
    /// Whether the turn was typed or spoken
    pub modality: Modality,
}

impl ConversationMessage {
    pub(crate) fn new(
        origin: MessageOrigin,
        modality: Modality,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            content: content.into(),
            origin,
            created_at,
            modality,
        }
    }

    /// Whether the user produced this message
    #[must_use]
    pub fn is_from_user(&self) -> bool {
        self.origin == MessageOrigin::User
    }

    /// Whether this message belongs to a voice turn
    #[must_use]
    pub fn is_voice(&self) -> bool {
        self.modality == Modality::Voice
    }

    /// Chat-completion role for this message
    #[must_use]
    pub const fn role(&self) -> &'static str {
        self.origin.role()
    }
}
