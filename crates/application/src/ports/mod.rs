//! Port definitions (interfaces for adapters)
//!
//! Ports define the boundaries between the application core and the
//! external services a turn talks to.

mod completion_port;
mod credential_store_port;
mod playback_port;
mod speech_port;

pub use completion_port::{CompletionPort, HistoryEntry};
pub use credential_store_port::CredentialStorePort;
pub use playback_port::PlaybackPort;
pub use speech_port::{SynthesisPort, TranscriptionPort};

#[cfg(test)]
pub use completion_port::MockCompletionPort;
#[cfg(test)]
pub use credential_store_port::MockCredentialStorePort;
#[cfg(test)]
pub use playback_port::MockPlaybackPort;
#[cfg(test)]
pub use speech_port::{MockSynthesisPort, MockTranscriptionPort};
