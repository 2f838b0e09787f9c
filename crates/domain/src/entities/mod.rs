//! Domain entities - Objects with identity and lifecycle

mod conversation;
mod conversation_message;

pub use conversation::Conversation;
pub use conversation_message::ConversationMessage;
