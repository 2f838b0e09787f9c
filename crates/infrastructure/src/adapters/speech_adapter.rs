//! Speech adapters - Implement TranscriptionPort and SynthesisPort using ai_speech

use std::sync::Arc;

use ai_speech::{
    ElevenLabsTranscriber, OpenAISpeechProvider, SpeechConfig, SpeechError, SpeechToText,
    TextToSpeech, TranscriptionProvider,
};
use application::{
    error::ApplicationError,
    ports::{CredentialStorePort, SynthesisPort, TranscriptionPort},
};
use async_trait::async_trait;
use domain::{AudioClip, CredentialKind};
use secrecy::SecretString;
use tracing::{debug, instrument, warn};

/// Map speech error to application error
fn map_error(err: SpeechError) -> ApplicationError {
    match err {
        SpeechError::Unauthorized(msg) => ApplicationError::Unauthorized(msg),
        SpeechError::ServerError { status, message } => ApplicationError::service(status, message),
        SpeechError::EmptyResponse(source) => ApplicationError::EmptyResponse(source),
        SpeechError::Timeout(ms) => ApplicationError::Timeout(ms),
        SpeechError::ConnectionFailed(msg) | SpeechError::RequestFailed(msg) => {
            ApplicationError::service(0, msg)
        },
        SpeechError::InvalidResponse(msg) => {
            ApplicationError::service(200, format!("Invalid response: {msg}"))
        },
        SpeechError::EmptyAudio => ApplicationError::EmptyInput,
        SpeechError::InvalidAudio(msg) => {
            ApplicationError::Internal(format!("Invalid audio: {msg}"))
        },
        SpeechError::SynthesisFailed(msg) => {
            ApplicationError::Internal(format!("Synthesis failed: {msg}"))
        },
        SpeechError::Configuration(msg) => ApplicationError::Configuration(msg),
    }
}

/// Adapter for speech-to-text services
pub struct TranscriptionAdapter {
    provider: Arc<dyn SpeechToText>,
}

impl std::fmt::Debug for TranscriptionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptionAdapter")
            .field("provider", &self.provider.model_name())
            .finish()
    }
}

impl TranscriptionAdapter {
    /// Create the adapter for the configured transcription provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to initialize.
    pub fn new(config: &SpeechConfig) -> Result<Self, ApplicationError> {
        let provider: Arc<dyn SpeechToText> = match config.transcription_provider {
            TranscriptionProvider::OpenAI => {
                Arc::new(OpenAISpeechProvider::new(config.clone()).map_err(map_error)?)
            },
            TranscriptionProvider::ElevenLabs => {
                Arc::new(ElevenLabsTranscriber::new(config).map_err(map_error)?)
            },
        };
        Ok(Self::with_provider(provider))
    }

    /// Wrap an existing provider
    pub fn with_provider(provider: Arc<dyn SpeechToText>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl TranscriptionPort for TranscriptionAdapter {
    #[instrument(skip(self, audio, credential), fields(format = %audio.format(), data_size = audio.len(), provider = self.provider.model_name()))]
    async fn transcribe(
        &self,
        audio: AudioClip,
        credential: &SecretString,
    ) -> Result<String, ApplicationError> {
        let transcription = self
            .provider
            .transcribe(audio, credential)
            .await
            .map_err(|e| {
                warn!(error = %e, "Transcription failed");
                map_error(e)
            })?;

        debug!(
            text_len = transcription.text.len(),
            language = ?transcription.language,
            "Transcription complete"
        );
        Ok(transcription.text)
    }
}

/// Where the synthesis call takes its key from when not the one passed in
struct StoredKey {
    store: Arc<dyn CredentialStorePort>,
    kind: CredentialKind,
}

/// Adapter for text-to-speech services
pub struct SynthesisAdapter {
    provider: Arc<dyn TextToSpeech>,
    stored_key: Option<StoredKey>,
}

impl std::fmt::Debug for SynthesisAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisAdapter")
            .field("model", &self.provider.model_name())
            .field("voice", &self.provider.default_voice())
            .field("stored_key", &self.stored_key.as_ref().map(|k| k.kind))
            .finish()
    }
}

impl SynthesisAdapter {
    /// Create an adapter backed by OpenAI TTS
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to initialize.
    pub fn new(config: SpeechConfig) -> Result<Self, ApplicationError> {
        let provider = OpenAISpeechProvider::new(config).map_err(map_error)?;
        Ok(Self::with_provider(Arc::new(provider)))
    }

    /// Wrap an existing provider
    pub fn with_provider(provider: Arc<dyn TextToSpeech>) -> Self {
        Self {
            provider,
            stored_key: None,
        }
    }

    /// Authorize synthesis with a stored credential instead of the one passed per call
    ///
    /// Used when transcription goes to a different vendor than synthesis.
    #[must_use]
    pub fn with_stored_key(
        mut self,
        store: Arc<dyn CredentialStorePort>,
        kind: CredentialKind,
    ) -> Self {
        self.stored_key = Some(StoredKey { store, kind });
        self
    }
}

#[async_trait]
impl SynthesisPort for SynthesisAdapter {
    #[instrument(skip(self, text, credential), fields(text_len = text.len(), model = self.provider.model_name()))]
    async fn synthesize(
        &self,
        text: &str,
        credential: &SecretString,
    ) -> Result<AudioClip, ApplicationError> {
        let stored = match &self.stored_key {
            Some(StoredKey { store, kind }) => Some(
                store
                    .get(*kind)
                    .await?
                    .ok_or(ApplicationError::MissingCredential(*kind))?,
            ),
            None => None,
        };
        let key = stored.as_ref().unwrap_or(credential);

        let clip = self
            .provider
            .synthesize(text, None, key)
            .await
            .map_err(|e| {
                warn!(error = %e, "Speech synthesis failed");
                map_error(e)
            })?;

        debug!(audio_size = clip.len(), format = %clip.format(), "Speech synthesis complete");
        Ok(clip)
    }
}
