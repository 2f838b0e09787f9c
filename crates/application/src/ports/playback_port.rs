//! Playback port - Where synthesized replies end up

use async_trait::async_trait;
use domain::AudioClip;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for handing synthesized audio to the user
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PlaybackPort: Send + Sync {
    /// Play (or otherwise deliver) the clip
    async fn play(&self, audio: AudioClip) -> Result<(), ApplicationError>;
}
