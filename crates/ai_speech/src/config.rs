//! Configuration for speech processing

use domain::AudioFormat;
use serde::{Deserialize, Serialize};

/// Configuration for speech processing services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Which service transcribes recordings
    #[serde(default)]
    pub transcription_provider: TranscriptionProvider,

    /// OpenAI API base URL (for custom endpoints)
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// ElevenLabs API base URL
    #[serde(default = "default_elevenlabs_base_url")]
    pub elevenlabs_base_url: String,

    /// Speech-to-text model
    #[serde(default = "default_stt_model")]
    pub stt_model: String,

    /// Text-to-speech model
    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// Default voice for TTS
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// Output audio format for TTS
    #[serde(default = "default_output_format")]
    pub output_format: AudioFormat,

    /// TTS speaking speed (0.25 to 4.0)
    #[serde(default = "default_speed")]
    pub speed: f32,

    /// Language hint for transcription (ISO 639-1)
    #[serde(default)]
    pub language: Option<String>,

    /// Transcription response format: `json` or `text`
    #[serde(default = "default_response_format")]
    pub response_format: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Transcription provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionProvider {
    /// OpenAI Whisper, multipart upload
    #[default]
    OpenAI,
    /// ElevenLabs, base64 JSON upload
    ElevenLabs,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_elevenlabs_base_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_stt_model() -> String {
    "whisper-1".to_string()
}

fn default_tts_model() -> String {
    "tts-1".to_string()
}

fn default_voice() -> String {
    "nova".to_string()
}

const fn default_output_format() -> AudioFormat {
    AudioFormat::Mp3
}

const fn default_speed() -> f32 {
    1.0
}

fn default_response_format() -> String {
    "json".to_string()
}

const fn default_timeout_ms() -> u64 {
    30000 // 30 seconds
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            transcription_provider: TranscriptionProvider::default(),
            openai_base_url: default_openai_base_url(),
            elevenlabs_base_url: default_elevenlabs_base_url(),
            stt_model: default_stt_model(),
            tts_model: default_tts_model(),
            default_voice: default_voice(),
            output_format: default_output_format(),
            speed: default_speed(),
            language: None,
            response_format: default_response_format(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl SpeechConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.25..=4.0).contains(&self.speed) {
            return Err(format!(
                "Speed must be between 0.25 and 4.0, got {}",
                self.speed
            ));
        }

        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        if self.stt_model.trim().is_empty() || self.tts_model.trim().is_empty() {
            return Err("Speech model names must not be empty".to_string());
        }

        if !matches!(self.response_format.as_str(), "json" | "text") {
            return Err(format!(
                "Response format must be json or text, got {}",
                self.response_format
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = SpeechConfig::default();

        assert_eq!(config.transcription_provider, TranscriptionProvider::OpenAI);
        assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
        assert_eq!(config.elevenlabs_base_url, "https://api.elevenlabs.io");
        assert_eq!(config.stt_model, "whisper-1");
        assert_eq!(config.tts_model, "tts-1");
        assert_eq!(config.default_voice, "nova");
        assert_eq!(config.output_format, AudioFormat::Mp3);
        assert_eq!(config.response_format, "json");
        assert_eq!(config.timeout_ms, 30000);
        assert!((config.speed - 1.0).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_fails_with_invalid_speed() {
        let mut config = SpeechConfig::default();
        config.speed = 0.1;
        assert!(config.validate().is_err());

        config.speed = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_fails_with_zero_timeout() {
        let config = SpeechConfig {
            timeout_ms: 0,
            ..SpeechConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_fails_with_unknown_response_format() {
        let config = SpeechConfig {
            response_format: "srt".to_string(),
            ..SpeechConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn provider_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TranscriptionProvider::OpenAI).unwrap(),
            "\"openai\""
        );
        assert_eq!(
            serde_json::to_string(&TranscriptionProvider::ElevenLabs).unwrap(),
            "\"elevenlabs\""
        );
    }

    #[test]
    fn config_deserializes_from_toml() {
        let toml = r#"
            transcription_provider = "elevenlabs"
            tts_model = "tts-1-hd"
            default_voice = "alloy"
            output_format = "opus"
            language = "de"
            speed = 1.25
        "#;

        let config: SpeechConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.transcription_provider, TranscriptionProvider::ElevenLabs);
        assert_eq!(config.tts_model, "tts-1-hd");
        assert_eq!(config.default_voice, "alloy");
        assert_eq!(config.output_format, AudioFormat::Opus);
        assert_eq!(config.language.as_deref(), Some("de"));
        assert!((config.speed - 1.25).abs() < f32::EPSILON);
        assert_eq!(config.stt_model, "whisper-1");
    }
}
