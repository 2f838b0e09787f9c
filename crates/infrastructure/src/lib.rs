//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer.
//! Contains adapters for the completion and speech clients, credential
//! storage, reply playback, configuration loading and logging setup.

pub mod adapters;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, CredentialsAppConfig, OrchestratorAppConfig, PlaybackAppConfig};
pub use telemetry::{TelemetryConfig, TelemetryError, init_telemetry};
