//! Turn execution settings: call timeout, event buffer, credential policy

use std::time::Duration;

use application::{
    error::ApplicationError,
    services::{CredentialPolicy, OrchestratorConfig},
};
use domain::CredentialKind;
use serde::{Deserialize, Serialize};

/// Orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorAppConfig {
    /// Upper bound for each external call in milliseconds
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    /// Buffered turn events per subscriber
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Credentials a text turn needs
    #[serde(default = "default_text_requires")]
    pub text_requires: Vec<CredentialKind>,

    /// Credentials a voice turn needs
    #[serde(default = "default_voice_requires")]
    pub voice_requires: Vec<CredentialKind>,
}

const fn default_call_timeout_ms() -> u64 {
    30_000
}

const fn default_event_capacity() -> usize {
    64
}

fn default_text_requires() -> Vec<CredentialKind> {
    vec![CredentialKind::Completion]
}

fn default_voice_requires() -> Vec<CredentialKind> {
    vec![CredentialKind::Completion, CredentialKind::Speech]
}

impl Default for OrchestratorAppConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: default_call_timeout_ms(),
            event_capacity: default_event_capacity(),
            text_requires: default_text_requires(),
            voice_requires: default_voice_requires(),
        }
    }
}

impl OrchestratorAppConfig {
    /// Runtime settings for the orchestrator
    pub const fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            call_timeout: Duration::from_millis(self.call_timeout_ms),
            event_capacity: self.event_capacity,
        }
    }

    /// Credential requirements per turn type
    ///
    /// # Errors
    ///
    /// Fails if a list omits a credential its turn type calls a service with.
    pub fn credential_policy(&self) -> Result<CredentialPolicy, ApplicationError> {
        CredentialPolicy::new(
            self.text_requires.iter().copied(),
            self.voice_requires.iter().copied(),
        )
    }
}

#[cfg(test)]
mod tests {
    use domain::Modality;

    use super::*;

    #[test]
    fn defaults_match_turn_usage() {
        let config = OrchestratorAppConfig::default();
        let policy = config.credential_policy().unwrap();

        assert_eq!(policy.required_for(Modality::Text), &[CredentialKind::Completion]);
        assert_eq!(
            policy.required_for(Modality::Voice),
            &[CredentialKind::Completion, CredentialKind::Speech]
        );
        assert_eq!(
            config.orchestrator_config().call_timeout,
            Duration::from_secs(30)
        );
    }

    #[test]
    fn stricter_text_policy_is_allowed() {
        let config = OrchestratorAppConfig {
            text_requires: vec![CredentialKind::Completion, CredentialKind::Speech],
            ..OrchestratorAppConfig::default()
        };
        let policy = config.credential_policy().unwrap();
        assert_eq!(policy.required_for(Modality::Text).len(), 2);
    }

    #[test]
    fn looser_voice_policy_is_rejected() {
        let config = OrchestratorAppConfig {
            voice_requires: vec![CredentialKind::Completion],
            ..OrchestratorAppConfig::default()
        };
        assert!(matches!(
            config.credential_policy(),
            Err(ApplicationError::Configuration(_))
        ));
    }
}
