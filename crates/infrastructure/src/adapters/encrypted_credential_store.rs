//! Encrypted file credential store
//!
//! Persists credentials as a JSON map of storage key to
//! `base64(nonce || ciphertext)`, sealed with XChaCha20-Poly1305. The storage
//! key is bound to each ciphertext as associated data, so entries cannot be
//! swapped between names.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use application::{error::ApplicationError, ports::CredentialStorePort};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit, OsRng, Payload, rand_core::RngCore},
};
use domain::CredentialKind;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Nonce size for XChaCha20-Poly1305 (24 bytes)
const NONCE_SIZE: usize = 24;

/// Key size for XChaCha20-Poly1305 (256 bits = 32 bytes)
const KEY_SIZE: usize = 32;

/// On-disk layout of the credential file
#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    credentials: BTreeMap<String, String>,
}

/// Credential store that keeps sealed values in a file
pub struct EncryptedFileCredentialStore {
    cipher: XChaCha20Poly1305,
    path: PathBuf,
    // Serializes read-modify-write cycles on the file
    file_lock: Mutex<()>,
}

impl std::fmt::Debug for EncryptedFileCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedFileCredentialStore")
            .field("path", &self.path)
            .field("cipher", &"[XChaCha20Poly1305]")
            .finish_non_exhaustive()
    }
}

impl EncryptedFileCredentialStore {
    /// Open the store at `path`, loading the key from `key_path`
    ///
    /// A new random key is written to `key_path` if none exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the key file cannot be read, created or has the wrong size.
    pub async fn open(
        path: impl Into<PathBuf>,
        key_path: impl AsRef<Path>,
    ) -> Result<Self, ApplicationError> {
        let key = load_or_create_key(key_path.as_ref()).await?;
        Self::with_key(path, &key)
    }

    /// Open the store at `path` with an explicit key
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not exactly 32 bytes.
    pub fn with_key(path: impl Into<PathBuf>, key: &[u8]) -> Result<Self, ApplicationError> {
        if key.len() != KEY_SIZE {
            return Err(ApplicationError::Configuration(format!(
                "Encryption key must be {KEY_SIZE} bytes, got {}",
                key.len()
            )));
        }

        let cipher = XChaCha20Poly1305::new_from_slice(key).map_err(|e| {
            ApplicationError::Configuration(format!("Invalid encryption key: {e}"))
        })?;

        Ok(Self {
            cipher,
            path: path.into(),
            file_lock: Mutex::new(()),
        })
    }

    /// Generate a new random encryption key
    #[must_use]
    pub fn generate_key() -> [u8; KEY_SIZE] {
        let mut key = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        key
    }

    /// Location of the credential file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn seal(&self, name: &str, value: &SecretString) -> Result<String, ApplicationError> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: value.expose_secret().as_bytes(),
                    aad: name.as_bytes(),
                },
            )
            .map_err(|e| ApplicationError::Storage(format!("Encryption failed: {e}")))?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(sealed))
    }

    fn open_sealed(&self, name: &str, sealed: &str) -> Result<SecretString, ApplicationError> {
        let bytes = STANDARD
            .decode(sealed)
            .map_err(|e| ApplicationError::Storage(format!("Corrupt entry '{name}': {e}")))?;

        if bytes.len() < NONCE_SIZE {
            return Err(ApplicationError::Storage(format!(
                "Corrupt entry '{name}': missing nonce"
            )));
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(
                XNonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: name.as_bytes(),
                },
            )
            .map_err(|e| {
                warn!(entry = name, "Decryption failed - data may be corrupted or key mismatch");
                ApplicationError::Storage(format!("Decryption of '{name}' failed: {e}"))
            })?;

        let value = String::from_utf8(plaintext)
            .map_err(|_| ApplicationError::Storage(format!("Entry '{name}' is not UTF-8")))?;
        Ok(SecretString::from(value))
    }

    async fn read_file(&self) -> Result<CredentialFile, ApplicationError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ApplicationError::Storage(format!(
                    "Failed to parse credential file '{}': {e}",
                    self.path.display()
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CredentialFile::default()),
            Err(e) => Err(ApplicationError::Storage(format!(
                "Failed to read credential file '{}': {e}",
                self.path.display()
            ))),
        }
    }

    async fn write_file(&self, file: &CredentialFile) -> Result<(), ApplicationError> {
        let json = serde_json::to_vec_pretty(file)
            .map_err(|e| ApplicationError::Storage(format!("Failed to encode credentials: {e}")))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_io("create directory for", &self.path, &e))?;
        }

        // Replace through a sibling temp file
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| storage_io("write", &tmp, &e))?;
        restrict_permissions(&tmp).await?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| storage_io("replace", &self.path, &e))
    }
}

#[async_trait]
impl CredentialStorePort for EncryptedFileCredentialStore {
    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    async fn save(&self, kind: CredentialKind, value: SecretString) -> Result<(), ApplicationError> {
        let _guard = self.file_lock.lock().await;

        let mut file = self.read_file().await?;
        let sealed = self.seal(kind.storage_key(), &value)?;
        file.credentials.insert(kind.storage_key().to_string(), sealed);
        self.write_file(&file).await?;

        debug!(%kind, "Credential saved");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn get(&self, kind: CredentialKind) -> Result<Option<SecretString>, ApplicationError> {
        let _guard = self.file_lock.lock().await;

        let file = self.read_file().await?;
        file.credentials
            .get(kind.storage_key())
            .map(|sealed| self.open_sealed(kind.storage_key(), sealed))
            .transpose()
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn clear(&self) -> Result<(), ApplicationError> {
        let _guard = self.file_lock.lock().await;

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Stored credentials cleared");
                Ok(())
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_io("remove", &self.path, &e)),
        }
    }
}

fn storage_io(action: &str, path: &Path, err: &std::io::Error) -> ApplicationError {
    ApplicationError::Storage(format!("Failed to {action} '{}': {err}", path.display()))
}

async fn load_or_create_key(key_path: &Path) -> Result<Vec<u8>, ApplicationError> {
    match tokio::fs::read(key_path).await {
        Ok(key) => Ok(key),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if let Some(parent) = key_path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    ApplicationError::Configuration(format!(
                        "Failed to create key directory '{}': {e}",
                        parent.display()
                    ))
                })?;
            }

            let key = EncryptedFileCredentialStore::generate_key();
            tokio::fs::write(key_path, key).await.map_err(|e| {
                ApplicationError::Configuration(format!(
                    "Failed to write encryption key file '{}': {e}",
                    key_path.display()
                ))
            })?;
            restrict_permissions(key_path).await?;

            info!(path = %key_path.display(), "Generated new credential encryption key");
            Ok(key.to_vec())
        },
        Err(e) => Err(ApplicationError::Configuration(format!(
            "Failed to read encryption key file '{}': {e}",
            key_path.display()
        ))),
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<(), ApplicationError> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .await
        .map_err(|e| storage_io("set permissions on", path, &e))
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<(), ApplicationError> {
    Ok(())
}
