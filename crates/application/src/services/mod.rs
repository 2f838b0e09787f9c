//! Application services - Use case implementations

mod conversation_orchestrator;
mod credential_policy;
mod credential_service;

pub use conversation_orchestrator::{
    ConversationOrchestrator, OrchestratorConfig, TurnEvent, VoiceTurn,
};
pub use credential_policy::CredentialPolicy;
pub use credential_service::{CredentialService, CredentialStatus, mask_secret};
