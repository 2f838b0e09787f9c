//! Port definitions for speech processing
//!
//! Defines the traits (ports) that speech processing adapters must implement.

use async_trait::async_trait;
use domain::AudioClip;
use secrecy::SecretString;

use crate::error::SpeechError;
use crate::types::Transcription;

/// Port for Speech-to-Text (STT) implementations
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe audio to text
    ///
    /// # Arguments
    ///
    /// * `audio` - Encoded recording
    /// * `api_key` - Key for the transcription service
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if transcription fails or the transcript is blank.
    async fn transcribe(
        &self,
        audio: AudioClip,
        api_key: &SecretString,
    ) -> Result<Transcription, SpeechError>;

    /// Get the name of the current STT model or provider
    fn model_name(&self) -> &str;
}

/// Port for Text-to-Speech (TTS) implementations
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Convert text to speech
    ///
    /// # Arguments
    ///
    /// * `text` - Text to synthesize
    /// * `voice` - Optional voice ID to use (uses default if None)
    /// * `api_key` - Key for the synthesis service
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if synthesis fails.
    async fn synthesize(
        &self,
        text: &str,
        voice: Option<&str>,
        api_key: &SecretString,
    ) -> Result<AudioClip, SpeechError>;

    /// Get the name of the current TTS model
    fn model_name(&self) -> &str;

    /// Get the default voice ID
    fn default_voice(&self) -> &str;
}
