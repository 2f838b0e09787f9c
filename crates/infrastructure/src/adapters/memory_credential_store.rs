//! In-memory credential store
//!
//! Holds credentials for the lifetime of the process only.

use std::collections::HashMap;

use application::{error::ApplicationError, ports::CredentialStorePort};
use async_trait::async_trait;
use domain::CredentialKind;
use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};

/// Credential store backed by a map
#[derive(Default)]
pub struct InMemoryCredentialStore {
    values: RwLock<HashMap<CredentialKind, SecretString>>,
}

impl std::fmt::Debug for InMemoryCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCredentialStore")
            .field("stored", &self.values.read().len())
            .finish_non_exhaustive()
    }
}

impl InMemoryCredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStorePort for InMemoryCredentialStore {
    async fn save(&self, kind: CredentialKind, value: SecretString) -> Result<(), ApplicationError> {
        self.values.write().insert(kind, value);
        Ok(())
    }

    async fn get(&self, kind: CredentialKind) -> Result<Option<SecretString>, ApplicationError> {
        Ok(self
            .values
            .read()
            .get(&kind)
            .map(|v| SecretString::from(v.expose_secret())))
    }

    async fn clear(&self) -> Result<(), ApplicationError> {
        self.values.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_get_clear() {
        let store = InMemoryCredentialStore::new();
        assert!(store.get(CredentialKind::Speech).await.unwrap().is_none());

        store
            .save(CredentialKind::Speech, SecretString::from("xi-123"))
            .await
            .unwrap();
        let value = store.get(CredentialKind::Speech).await.unwrap().unwrap();
        assert_eq!(value.expose_secret(), "xi-123");
        assert!(!store.has_all(&CredentialKind::ALL).await.unwrap());

        store.clear().await.unwrap();
        assert!(store.get(CredentialKind::Speech).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_replaces_existing_value() {
        let store = InMemoryCredentialStore::new();
        store
            .save(CredentialKind::Completion, SecretString::from("old"))
            .await
            .unwrap();
        store
            .save(CredentialKind::Completion, SecretString::from("new"))
            .await
            .unwrap();

        let value = store.get(CredentialKind::Completion).await.unwrap().unwrap();
        assert_eq!(value.expose_secret(), "new");
    }

    #[test]
    fn debug_hides_values() {
        let store = InMemoryCredentialStore::new();
        store
            .values
            .write()
            .insert(CredentialKind::Completion, SecretString::from("sk-secret"));
        let debug = format!("{store:?}");
        assert!(debug.contains("stored: 1"));
        assert!(!debug.contains("sk-secret"));
    }
}
