//! Speech processing provider implementations
//!
//! Contains concrete implementations of the `SpeechToText` and `TextToSpeech` traits.

pub mod elevenlabs;
pub mod openai;

pub use elevenlabs::ElevenLabsTranscriber;
pub use openai::OpenAISpeechProvider;

use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::SpeechError;

/// OpenAI-style error body: `{"error": {"message": ...}}`
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// ElevenLabs-style error body: `{"detail": {"message": ...}}` or `{"detail": "..."}`
#[derive(Debug, Deserialize)]
struct DetailError {
    detail: Detail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Detail {
    Text(String),
    Object { message: String },
}

/// Best human-readable message in an error body
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<ApiError>(body)
        .map(|e| e.error.message)
        .or_else(|_| {
            serde_json::from_str::<DetailError>(body).map(|e| match e.detail {
                Detail::Text(message) | Detail::Object { message } => message,
            })
        })
        .ok()
        .filter(|m| !m.trim().is_empty());

    from_json
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string())
}

/// Map a non-success response onto the error taxonomy
pub(crate) fn status_error(status: StatusCode, body: &str) -> SpeechError {
    let message = error_message(status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SpeechError::Unauthorized(message),
        _ => SpeechError::ServerError {
            status: status.as_u16(),
            message,
        },
    }
}

/// Map a transport failure, reporting the configured timeout
pub(crate) fn send_error(err: reqwest::Error, timeout_ms: u64) -> SpeechError {
    if err.is_timeout() {
        SpeechError::Timeout(timeout_ms)
    } else {
        SpeechError::from(err)
    }
}
