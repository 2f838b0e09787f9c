//! ElevenLabs transcription provider
//!
//! Sends the recording base64-encoded in a JSON body to `/v1/speech-to-text`
//! and authenticates with the `xi-api-key` header.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use domain::AudioClip;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{send_error, status_error};
use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::SpeechToText;
use crate::types::Transcription;

const API_KEY_HEADER: &str = "xi-api-key";
const PROVIDER_NAME: &str = "elevenlabs";

/// Speech-to-text client for the ElevenLabs API
#[derive(Debug, Clone)]
pub struct ElevenLabsTranscriber {
    client: Client,
    base_url: String,
    timeout_ms: u64,
}

#[derive(Debug, Serialize)]
struct TranscriptionRequest {
    audio: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    language_code: Option<String>,
}

impl ElevenLabsTranscriber {
    /// Create a transcriber from the shared speech configuration
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the HTTP client cannot be built.
    pub fn new(config: &SpeechConfig) -> Result<Self, SpeechError> {
        if config.timeout_ms == 0 {
            return Err(SpeechError::Configuration(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config.elevenlabs_base_url.trim_end_matches('/').to_string(),
            timeout_ms: config.timeout_ms,
        })
    }

    fn url(&self) -> String {
        format!("{}/v1/speech-to-text", self.base_url)
    }
}

#[async_trait]
impl SpeechToText for ElevenLabsTranscriber {
    #[instrument(skip(self, audio, api_key), fields(audio_size = audio.len(), format = %audio.format()))]
    async fn transcribe(
        &self,
        audio: AudioClip,
        api_key: &SecretString,
    ) -> Result<Transcription, SpeechError> {
        debug!("Transcribing audio with ElevenLabs");

        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }

        let request = TranscriptionRequest {
            audio: STANDARD.encode(audio.data()),
        };

        let response = self
            .client
            .post(self.url())
            .header(API_KEY_HEADER, api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout_ms))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| send_error(e, self.timeout_ms))?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let parsed: TranscriptionResponse = serde_json::from_str(&body)
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let text = parsed.text.unwrap_or_default();
        let text = text.trim();
        if text.is_empty() {
            return Err(SpeechError::EmptyResponse("ElevenLabs".to_string()));
        }

        let mut transcription = Transcription::new(text);
        if let Some(lang) = parsed.language_code {
            transcription = transcription.with_language(lang);
        }

        debug!(text_len = transcription.text.len(), "Transcription complete");
        Ok(transcription)
    }

    fn model_name(&self) -> &str {
        PROVIDER_NAME
    }
}
