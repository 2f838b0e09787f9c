//! Speech ports - Interfaces for speech-to-text and text-to-speech

use async_trait::async_trait;
use domain::AudioClip;
#[cfg(test)]
use mockall::automock;
use secrecy::SecretString;

use crate::error::ApplicationError;

/// Port for speech-to-text
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TranscriptionPort: Send + Sync {
    /// Transcribe a recorded clip to text
    ///
    /// # Arguments
    /// * `audio` - Encoded recording
    /// * `credential` - API key for the speech service
    async fn transcribe(
        &self,
        audio: AudioClip,
        credential: &SecretString,
    ) -> Result<String, ApplicationError>;
}

/// Port for text-to-speech
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SynthesisPort: Send + Sync {
    /// Synthesize speech for `text`
    ///
    /// # Arguments
    /// * `text` - Text to speak
    /// * `credential` - API key for the speech service
    async fn synthesize(
        &self,
        text: &str,
        credential: &SecretString,
    ) -> Result<AudioClip, ApplicationError>;
}
