//! Credential store port - Persistence of API keys

use async_trait::async_trait;
use domain::CredentialKind;
#[cfg(test)]
use mockall::automock;
use secrecy::{ExposeSecret, SecretString};

use crate::error::ApplicationError;

/// Port for credential persistence
///
/// Values survive restarts until [`CredentialStorePort::clear`] is called.
/// Implementations never log credential values.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CredentialStorePort: Send + Sync {
    /// Store (or replace) a credential
    async fn save(&self, kind: CredentialKind, value: SecretString)
    -> Result<(), ApplicationError>;

    /// Retrieve a credential, `None` if it was never stored
    async fn get(&self, kind: CredentialKind) -> Result<Option<SecretString>, ApplicationError>;

    /// Whether every listed credential is present
    ///
    /// A stored value of only whitespace counts as absent, matching what a turn accepts.
    async fn has_all(&self, kinds: &[CredentialKind]) -> Result<bool, ApplicationError> {
        for kind in kinds {
            let present = self
                .get(*kind)
                .await?
                .is_some_and(|value| !value.expose_secret().trim().is_empty());
            if !present {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Remove every stored credential
    async fn clear(&self) -> Result<(), ApplicationError>;
}
