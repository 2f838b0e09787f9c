//! Which credentials each kind of turn needs

use domain::{CredentialKind, Modality};

use crate::error::ApplicationError;

/// Credentials that must be present before a turn may start
///
/// A policy may demand more than a turn strictly uses, never less: text turns
/// always need the completion key, voice turns need both keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPolicy {
    text: Vec<CredentialKind>,
    voice: Vec<CredentialKind>,
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self {
            text: Self::used_by(Modality::Text).to_vec(),
            voice: Self::used_by(Modality::Voice).to_vec(),
        }
    }
}

impl CredentialPolicy {
    /// Build a policy from explicit requirement lists
    ///
    /// Duplicates are removed. Fails if a list omits a credential the turn
    /// itself uses.
    pub fn new(
        text: impl IntoIterator<Item = CredentialKind>,
        voice: impl IntoIterator<Item = CredentialKind>,
    ) -> Result<Self, ApplicationError> {
        let policy = Self {
            text: normalize(text),
            voice: normalize(voice),
        };

        for modality in [Modality::Text, Modality::Voice] {
            let required = policy.required_for(modality);
            if let Some(missing) = Self::used_by(modality)
                .iter()
                .find(|kind| !required.contains(kind))
            {
                return Err(ApplicationError::Configuration(format!(
                    "{modality} turns use the {} but the policy does not require it",
                    missing.label()
                )));
            }
        }

        Ok(policy)
    }

    /// Credentials a turn of this modality calls services with
    pub const fn used_by(modality: Modality) -> &'static [CredentialKind] {
        match modality {
            Modality::Text => &[CredentialKind::Completion],
            Modality::Voice => &[CredentialKind::Completion, CredentialKind::Speech],
        }
    }

    /// Credentials checked before a turn of this modality starts
    pub fn required_for(&self, modality: Modality) -> &[CredentialKind] {
        match modality {
            Modality::Text => &self.text,
            Modality::Voice => &self.voice,
        }
    }
}

fn normalize(kinds: impl IntoIterator<Item = CredentialKind>) -> Vec<CredentialKind> {
    let mut kinds: Vec<_> = kinds.into_iter().collect();
    kinds.sort_unstable();
    kinds.dedup();
    kinds
}
