//! Credential service - Setting, inspecting and seeding API keys

use std::{fmt, sync::Arc};

use domain::{CredentialKind, DomainError};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{error::ApplicationError, ports::CredentialStorePort};

/// Whether a credential is configured, with a masked preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialStatus {
    /// Which credential
    pub kind: CredentialKind,
    /// Whether a non-empty value is stored
    pub configured: bool,
    /// First characters of the stored value, never the full key
    pub preview: Option<String>,
}

/// Mask a secret for display: the first four characters followed by `…`
///
/// Values of four characters or fewer are fully hidden.
pub fn mask_secret(secret: &str) -> String {
    const VISIBLE: usize = 4;
    if secret.chars().count() <= VISIBLE {
        return "****".to_string();
    }
    let prefix: String = secret.chars().take(VISIBLE).collect();
    format!("{prefix}…")
}

/// Application service over the credential store
pub struct CredentialService {
    store: Arc<dyn CredentialStorePort>,
}

impl fmt::Debug for CredentialService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialService").finish_non_exhaustive()
    }
}

impl CredentialService {
    /// Create a new credential service
    pub fn new(store: Arc<dyn CredentialStorePort>) -> Self {
        Self { store }
    }

    /// Store a credential after trimming surrounding whitespace
    #[instrument(skip(self, value))]
    pub async fn set(&self, kind: CredentialKind, value: &str) -> Result<(), ApplicationError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(DomainError::ValidationError(format!("{} is empty", kind.label())).into());
        }
        debug!(preview = %mask_secret(value), "Saving credential");
        self.store.save(kind, SecretString::from(value)).await?;
        info!("Credential saved");
        Ok(())
    }

    /// Report every known credential
    pub async fn status(&self) -> Result<Vec<CredentialStatus>, ApplicationError> {
        let mut report = Vec::with_capacity(CredentialKind::ALL.len());
        for kind in CredentialKind::ALL {
            let value = self
                .store
                .get(kind)
                .await?
                .filter(|v| !v.expose_secret().trim().is_empty());
            report.push(CredentialStatus {
                kind,
                configured: value.is_some(),
                preview: value.map(|v| mask_secret(v.expose_secret())),
            });
        }
        Ok(report)
    }

    /// Whether every listed credential is stored
    pub async fn has_all(&self, kinds: &[CredentialKind]) -> Result<bool, ApplicationError> {
        self.store.has_all(kinds).await
    }

    /// Remove every stored credential
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), ApplicationError> {
        self.store.clear().await?;
        info!("All credentials cleared");
        Ok(())
    }

    /// Store the demo completion key if none is stored yet
    ///
    /// Returns `true` if the key was written.
    #[instrument(skip(self, demo_key))]
    pub async fn seed_demo_credentials(
        &self,
        demo_key: Option<&SecretString>,
    ) -> Result<bool, ApplicationError> {
        let Some(demo_key) = demo_key.filter(|k| !k.expose_secret().trim().is_empty()) else {
            return Ok(false);
        };

        if self.store.get(CredentialKind::Completion).await?.is_some() {
            debug!("Completion key already stored, demo key not applied");
            return Ok(false);
        }

        self.store
            .save(
                CredentialKind::Completion,
                SecretString::from(demo_key.expose_secret()),
            )
            .await?;
        info!(preview = %mask_secret(demo_key.expose_secret()), "Demo completion key seeded");
        Ok(true)
    }
}
