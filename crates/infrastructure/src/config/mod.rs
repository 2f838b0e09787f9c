//! Application configuration
//!
//! Split into focused sub-modules:
//! - `orchestrator`: call timeout, event buffer, credential policy
//! - `storage`: credential files and reply audio output
//!
//! Completion and speech sections reuse the client crates' own config types.

mod orchestrator;
mod storage;

use std::collections::HashMap;
use std::path::Path;

use ai_core::CompletionConfig;
use ai_speech::SpeechConfig;
use application::error::ApplicationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use orchestrator::OrchestratorAppConfig;
pub use storage::{CredentialsAppConfig, PlaybackAppConfig};

use crate::telemetry::TelemetryConfig;

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "COACHTALK";

/// Separator between the prefix and nested keys, e.g. `COACHTALK__COMPLETION__MODEL`
pub const ENV_SEPARATOR: &str = "__";

/// Separator for list values in the environment, e.g. `completion,speech`
pub const LIST_SEPARATOR: &str = ",";

/// Configuration file looked up in the working directory (`coachtalk.toml`)
pub const DEFAULT_CONFIG_NAME: &str = "coachtalk";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chat-completion client
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Speech clients
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Turn execution
    #[serde(default)]
    pub orchestrator: OrchestratorAppConfig,

    /// Credential storage
    #[serde(default)]
    pub credentials: CredentialsAppConfig,

    /// Reply audio output
    #[serde(default)]
    pub playback: PlaybackAppConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from defaults, a TOML file and the environment
    ///
    /// With `path` the file must exist. Without it `coachtalk.toml` is used
    /// if present. `COACHTALK__SECTION__KEY` variables override both.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Like [`AppConfig::load`], reading variables from `env` instead of the process
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let builder = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .list_separator(LIST_SEPARATOR)
                    .with_list_parse_key("orchestrator.text_requires")
                    .with_list_parse_key("orchestrator.voice_requires")
                    .try_parsing(true)
                    .source(env),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        debug!(
            model = %config.completion.model,
            transcription = ?config.speech.transcription_provider,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Check values the clients would otherwise reject at first use
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` naming the first invalid value.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let invalid = |msg: String| Err(ApplicationError::Configuration(msg));

        let completion = &self.completion;
        if completion.base_url.trim().is_empty() {
            return invalid("completion.base_url must not be empty".to_string());
        }
        if completion.model.trim().is_empty() {
            return invalid("completion.model must not be empty".to_string());
        }
        if completion.max_tokens == 0 {
            return invalid("completion.max_tokens must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&completion.temperature) {
            return invalid(format!(
                "completion.temperature must be between 0.0 and 2.0, got {}",
                completion.temperature
            ));
        }
        if completion.timeout_ms == 0 {
            return invalid("completion.timeout_ms must be greater than 0".to_string());
        }

        self.speech
            .validate()
            .map_err(|e| ApplicationError::Configuration(format!("speech: {e}")))?;

        if self.orchestrator.call_timeout_ms == 0 {
            return invalid("orchestrator.call_timeout_ms must be greater than 0".to_string());
        }
        if self.orchestrator.event_capacity == 0 {
            return invalid("orchestrator.event_capacity must be greater than 0".to_string());
        }
        self.orchestrator.credential_policy()?;

        if self
            .playback
            .command
            .as_deref()
            .is_some_and(|c| c.trim().is_empty())
        {
            return invalid("playback.command must not be blank".to_string());
        }

        Ok(())
    }
}
