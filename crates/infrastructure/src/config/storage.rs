//! Local storage: credential files and reply audio output

use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "coachtalk";

/// Per-user application directory, falling back to a hidden directory in the working dir
fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.map_or_else(|| PathBuf::from(".coachtalk"), |dir| dir.join(APP_DIR))
}

/// Credential storage configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsAppConfig {
    /// Encrypted credential file (default: `<config dir>/coachtalk/credentials.json`)
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Encryption key file, generated on first use (default: `<config dir>/coachtalk/credentials.key`)
    #[serde(default)]
    pub key_path: Option<PathBuf>,

    /// Keep credentials in memory only, nothing is written to disk
    #[serde(default)]
    pub in_memory: bool,

    /// Completion key stored at startup when none is present (demo mode)
    #[serde(default, skip_serializing)]
    pub demo_completion_key: Option<SecretString>,
}

impl std::fmt::Debug for CredentialsAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsAppConfig")
            .field("store_path", &self.store_path)
            .field("key_path", &self.key_path)
            .field("in_memory", &self.in_memory)
            .field(
                "demo_completion_key",
                &self.demo_completion_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl CredentialsAppConfig {
    /// Credential file location with the default applied
    pub fn resolved_store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| app_dir(dirs::config_dir()).join("credentials.json"))
    }

    /// Key file location with the default applied
    pub fn resolved_key_path(&self) -> PathBuf {
        self.key_path
            .clone()
            .unwrap_or_else(|| app_dir(dirs::config_dir()).join("credentials.key"))
    }
}

/// Playback configuration for synthesized replies
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaybackAppConfig {
    /// Directory reply audio is written to (default: `<cache dir>/coachtalk/replies`)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// External player run with the written file as last argument (e.g. `mpv`)
    #[serde(default)]
    pub command: Option<String>,

    /// Extra player arguments placed before the file path
    #[serde(default)]
    pub args: Vec<String>,
}

impl PlaybackAppConfig {
    /// Output directory with the default applied
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| app_dir(dirs::cache_dir()).join("replies"))
    }
}
