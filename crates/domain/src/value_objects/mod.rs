//! Value objects - Immutable objects defined by their attributes

mod audio;
mod credential_kind;
mod message_id;
mod modality;
mod turn_state;

pub use audio::{AudioClip, AudioFormat};
pub use credential_kind::CredentialKind;
pub use message_id::MessageId;
pub use modality::{MessageOrigin, Modality};
pub use turn_state::TurnState;
