//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod completion_adapter;
mod encrypted_credential_store;
mod file_playback_adapter;
mod memory_credential_store;
mod speech_adapter;

pub use completion_adapter::CompletionAdapter;
pub use encrypted_credential_store::EncryptedFileCredentialStore;
pub use file_playback_adapter::FilePlaybackAdapter;
pub use memory_credential_store::InMemoryCredentialStore;
pub use speech_adapter::{SynthesisAdapter, TranscriptionAdapter};
