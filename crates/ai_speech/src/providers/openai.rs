//! OpenAI Speech Provider
//!
//! Implements `SpeechToText` using OpenAI Whisper and `TextToSpeech` using OpenAI TTS.
//!
//! ## STT (Whisper)
//! Multipart upload of the recording to `/audio/transcriptions`.
//!
//! ## TTS
//! JSON request to `/audio/speech`; the body of the answer is the encoded audio.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use domain::{AudioClip, AudioFormat};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{send_error, status_error};
use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::{SpeechToText, TextToSpeech};
use crate::types::Transcription;

/// Longest input the TTS endpoint accepts
const MAX_TTS_INPUT_CHARS: usize = 4096;

/// OpenAI speech provider implementing both STT and TTS
#[derive(Debug, Clone)]
pub struct OpenAISpeechProvider {
    client: Client,
    config: SpeechConfig,
}

impl OpenAISpeechProvider {
    /// Create a new OpenAI speech provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid.
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Active configuration
    pub const fn config(&self) -> &SpeechConfig {
        &self.config
    }

    fn stt_url(&self) -> String {
        format!(
            "{}/audio/transcriptions",
            self.config.openai_base_url.trim_end_matches('/')
        )
    }

    fn tts_url(&self) -> String {
        format!(
            "{}/audio/speech",
            self.config.openai_base_url.trim_end_matches('/')
        )
    }

    /// Map a requested container onto a TTS `response_format` and the format actually returned
    const fn tts_format(format: AudioFormat) -> (&'static str, AudioFormat) {
        match format {
            AudioFormat::Mp3 => ("mp3", AudioFormat::Mp3),
            AudioFormat::Opus | AudioFormat::Ogg | AudioFormat::Webm => ("opus", AudioFormat::Opus),
            AudioFormat::M4a | AudioFormat::Mp4 | AudioFormat::Aac => ("aac", AudioFormat::Aac),
            AudioFormat::Flac => ("flac", AudioFormat::Flac),
            AudioFormat::Wav => ("wav", AudioFormat::Wav),
        }
    }

    fn parse_transcription(&self, body: &str) -> Result<Transcription, SpeechError> {
        let transcription = if self.config.response_format == "text" {
            Transcription::new(body.trim())
        } else {
            let whisper: WhisperResponse = serde_json::from_str(body).map_err(|e| {
                SpeechError::InvalidResponse(format!("Failed to parse response: {e}"))
            })?;

            let mut transcription = Transcription::new(whisper.text.trim());
            if let Some(lang) = whisper.language {
                transcription = transcription.with_language(lang);
            }
            if let Some(duration) = whisper.duration {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let duration_ms = (duration * 1000.0) as u64;
                transcription = transcription.with_duration(duration_ms);
            }
            transcription
        };

        if transcription.is_blank() {
            return Err(SpeechError::EmptyResponse("OpenAI Whisper".to_string()));
        }
        Ok(transcription)
    }
}

/// OpenAI Whisper transcription response
#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

/// OpenAI TTS request body
#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f32>,
}

#[async_trait]
impl SpeechToText for OpenAISpeechProvider {
    #[instrument(skip(self, audio, api_key), fields(audio_size = audio.len(), format = %audio.format()))]
    async fn transcribe(
        &self,
        audio: AudioClip,
        api_key: &SecretString,
    ) -> Result<Transcription, SpeechError> {
        debug!("Transcribing audio with OpenAI Whisper");

        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }

        let filename = audio.file_name("audio");
        let mime_type = audio.format().mime_type();

        let file_part = Part::bytes(audio.into_data())
            .file_name(filename)
            .mime_str(mime_type)
            .map_err(|e| SpeechError::InvalidAudio(format!("Invalid MIME type: {e}")))?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("model", self.config.stt_model.clone())
            .text("response_format", self.config.response_format.clone());
        if let Some(language) = &self.config.language {
            form = form.text("language", language.clone());
        }

        let response = self
            .client
            .post(self.stt_url())
            .bearer_auth(api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| send_error(e, self.config.timeout_ms))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| send_error(e, self.config.timeout_ms))?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let transcription = self.parse_transcription(&body)?;
        debug!(
            text_len = transcription.text.len(),
            language = ?transcription.language,
            "Transcription complete"
        );
        Ok(transcription)
    }

    fn model_name(&self) -> &str {
        &self.config.stt_model
    }
}

#[async_trait]
impl TextToSpeech for OpenAISpeechProvider {
    #[instrument(skip(self, text, api_key), fields(text_len = text.len()))]
    async fn synthesize(
        &self,
        text: &str,
        voice: Option<&str>,
        api_key: &SecretString,
    ) -> Result<AudioClip, SpeechError> {
        debug!("Synthesizing speech with OpenAI TTS");

        if text.trim().is_empty() {
            return Err(SpeechError::SynthesisFailed(
                "Text cannot be empty".to_string(),
            ));
        }

        let chars = text.chars().count();
        if chars > MAX_TTS_INPUT_CHARS {
            return Err(SpeechError::SynthesisFailed(format!(
                "Text too long: {chars} characters exceeds {MAX_TTS_INPUT_CHARS} limit"
            )));
        }

        let voice = voice.unwrap_or(&self.config.default_voice);
        let (response_format, output_format) = Self::tts_format(self.config.output_format);

        let request = TtsRequest {
            model: &self.config.tts_model,
            input: text,
            voice,
            response_format,
            speed: if (self.config.speed - 1.0).abs() < f32::EPSILON {
                None
            } else {
                Some(self.config.speed)
            },
        };

        let response = self
            .client
            .post(self.tts_url())
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(e, self.config.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let audio_bytes: Bytes = response
            .bytes()
            .await
            .map_err(|e| send_error(e, self.config.timeout_ms))?;

        if audio_bytes.is_empty() {
            return Err(SpeechError::EmptyResponse("OpenAI TTS".to_string()));
        }

        debug!(audio_size = audio_bytes.len(), "Speech synthesis complete");
        Ok(AudioClip::new(audio_bytes.to_vec(), output_format))
    }

    fn model_name(&self) -> &str {
        &self.config.tts_model
    }

    fn default_voice(&self) -> &str {
        &self.config.default_voice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(response_format: &str) -> OpenAISpeechProvider {
        OpenAISpeechProvider::new(SpeechConfig {
            response_format: response_format.to_string(),
            ..SpeechConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let config = SpeechConfig {
            speed: 9.0,
            ..SpeechConfig::default()
        };
        assert!(matches!(
            OpenAISpeechProvider::new(config),
            Err(SpeechError::Configuration(_))
        ));
    }

    #[test]
    fn tts_format_mapping() {
        assert_eq!(
            OpenAISpeechProvider::tts_format(AudioFormat::Mp3),
            ("mp3", AudioFormat::Mp3)
        );
        assert_eq!(
            OpenAISpeechProvider::tts_format(AudioFormat::Ogg),
            ("opus", AudioFormat::Opus)
        );
        assert_eq!(
            OpenAISpeechProvider::tts_format(AudioFormat::Webm),
            ("opus", AudioFormat::Opus)
        );
        assert_eq!(
            OpenAISpeechProvider::tts_format(AudioFormat::M4a),
            ("aac", AudioFormat::Aac)
        );
        assert_eq!(
            OpenAISpeechProvider::tts_format(AudioFormat::Wav),
            ("wav", AudioFormat::Wav)
        );
    }

    #[test]
    fn urls_tolerate_trailing_slash() {
        let p = OpenAISpeechProvider::new(SpeechConfig {
            openai_base_url: "http://localhost:9000/v1/".to_string(),
            ..SpeechConfig::default()
        })
        .unwrap();
        assert_eq!(p.stt_url(), "http://localhost:9000/v1/audio/transcriptions");
        assert_eq!(p.tts_url(), "http://localhost:9000/v1/audio/speech");
    }

    #[test]
    fn parses_json_transcription() {
        let t = provider("json")
            .parse_transcription(r#"{"text":" Hello coach ","language":"en","duration":1.5}"#)
            .unwrap();
        assert_eq!(t.text, "Hello coach");
        assert_eq!(t.language.as_deref(), Some("en"));
        assert_eq!(t.duration_ms, Some(1500));
    }

    #[test]
    fn parses_text_transcription() {
        let t = provider("text").parse_transcription("Hello coach\n").unwrap();
        assert_eq!(t.text, "Hello coach");
    }

    #[test]
    fn blank_transcription_is_empty_response() {
        assert!(matches!(
            provider("json").parse_transcription(r#"{"text":"   "}"#),
            Err(SpeechError::EmptyResponse(_))
        ));
        assert!(matches!(
            provider("text").parse_transcription(""),
            Err(SpeechError::EmptyResponse(_))
        ));
    }

    #[test]
    fn malformed_json_is_invalid_response() {
        assert!(matches!(
            provider("json").parse_transcription("not json"),
            Err(SpeechError::InvalidResponse(_))
        ));
    }
}
