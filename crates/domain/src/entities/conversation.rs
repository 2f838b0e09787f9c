//! Conversation entity - The append-only message history of a session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ConversationMessage;
use crate::value_objects::{MessageOrigin, Modality};

/// An ordered, append-only sequence of messages
///
/// Appending is the only mutation besides [`Conversation::clear`]. Timestamps
/// never decrease along the sequence, so insertion order and `created_at`
/// order agree and the list can be replayed as history without sorting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<ConversationMessage>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new message stamped with the current time
    pub fn append(
        &mut self,
        origin: MessageOrigin,
        modality: Modality,
        content: impl Into<String>,
    ) -> &ConversationMessage {
        self.append_at(origin, modality, content, Utc::now())
    }

    /// Append a new message stamped no earlier than `now`
    ///
    /// If the clock stepped backwards since the last append, the new message
    /// takes the previous message's timestamp instead.
    pub fn append_at(
        &mut self,
        origin: MessageOrigin,
        modality: Modality,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> &ConversationMessage {
        let created_at = self
            .messages
            .last()
            .map_or(now, |last| now.max(last.created_at));

        self.messages
            .push(ConversationMessage::new(origin, modality, content, created_at));

        let last = self.messages.len() - 1;
        &self.messages[last]
    }

    /// All messages, oldest first
    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// The most recent message
    pub fn last_message(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing has been said yet
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop every message and start over
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn new_conversation_is_empty() {
        let conv = Conversation::new();
        assert!(conv.is_empty());
        assert_eq!(conv.len(), 0);
        assert!(conv.last_message().is_none());
    }

    #[test]
    fn append_preserves_order() {
        let mut conv = Conversation::new();
        conv.append(MessageOrigin::User, Modality::Text, "Hello");
        conv.append(MessageOrigin::Assistant, Modality::Text, "Hi there");

        let contents: Vec<_> = conv.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["Hello", "Hi there"]);
        assert_eq!(conv.last_message().unwrap().origin, MessageOrigin::Assistant);
    }

    #[test]
    fn append_returns_the_new_message() {
        let mut conv = Conversation::new();
        let id = conv.append(MessageOrigin::User, Modality::Voice, "spoken").id;
        assert_eq!(conv.messages()[0].id, id);
        assert!(conv.messages()[0].is_voice());
    }

    #[test]
    fn timestamps_never_decrease_when_clock_steps_back() {
        let mut conv = Conversation::new();
        let now = Utc::now();
        conv.append_at(MessageOrigin::User, Modality::Text, "first", now);
        conv.append_at(
            MessageOrigin::Assistant,
            Modality::Text,
            "second",
            now - Duration::seconds(30),
        );

        let msgs = conv.messages();
        assert_eq!(msgs[1].created_at, msgs[0].created_at);
    }

    #[test]
    fn clear_empties_history() {
        let mut conv = Conversation::new();
        conv.append(MessageOrigin::User, Modality::Text, "Hello");
        conv.clear();
        assert!(conv.is_empty());
    }
}
