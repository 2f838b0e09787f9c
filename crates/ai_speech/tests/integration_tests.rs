//! Integration tests for ai_speech crate
//!
//! Runs the providers against mocked OpenAI and ElevenLabs endpoints.

use std::time::Duration;

use ai_speech::{
    ElevenLabsTranscriber, OpenAISpeechProvider, SpeechConfig, SpeechError, SpeechToText,
    TextToSpeech,
};
use domain::{AudioClip, AudioFormat};
use secrecy::SecretString;
use wiremock::matchers::{body_json, body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Create a test configuration pointing to mock server
fn test_config(base_url: &str) -> SpeechConfig {
    SpeechConfig {
        openai_base_url: base_url.to_string(),
        elevenlabs_base_url: base_url.to_string(),
        timeout_ms: 5000,
        ..Default::default()
    }
}

fn api_key() -> SecretString {
    SecretString::from("test-api-key")
}

/// Minimal MPEG-4 recording as produced by a phone recorder
fn recording() -> AudioClip {
    AudioClip::new(
        vec![
            0x00, 0x00, 0x00, 0x18, 0x66, 0x74, 0x79, 0x70, // ftyp box
            0x6D, 0x70, 0x34, 0x32, 0x00, 0x00, 0x00, 0x00, // mp42
        ],
        AudioFormat::Mp4,
    )
}

// ============ Whisper ============

#[tokio::test]
async fn whisper_transcription_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .and(header("Authorization", "Bearer test-api-key"))
        .and(body_string_contains("whisper-1"))
        .and(body_string_contains("audio.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "text": "Hello, this is a test transcription.",
            "language": "en",
            "duration": 2.5
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = OpenAISpeechProvider::new(test_config(&mock_server.uri())).unwrap();
    let transcription = provider.transcribe(recording(), &api_key()).await.unwrap();

    assert_eq!(transcription.text, "Hello, this is a test transcription.");
    assert_eq!(transcription.language.as_deref(), Some("en"));
    assert_eq!(transcription.duration_ms, Some(2500));
}

#[tokio::test]
async fn whisper_sends_language_hint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .and(body_string_contains("name=\"language\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "text": "Guten Morgen"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = SpeechConfig {
        language: Some("de".to_string()),
        ..test_config(&mock_server.uri())
    };
    let provider = OpenAISpeechProvider::new(config).unwrap();
    let transcription = provider.transcribe(recording(), &api_key()).await.unwrap();

    assert_eq!(transcription.text, "Guten Morgen");
}

#[tokio::test]
async fn whisper_plain_text_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Plain transcript\n"))
        .mount(&mock_server)
        .await;

    let config = SpeechConfig {
        response_format: "text".to_string(),
        ..test_config(&mock_server.uri())
    };
    let provider = OpenAISpeechProvider::new(config).unwrap();
    let transcription = provider.transcribe(recording(), &api_key()).await.unwrap();

    assert_eq!(transcription.text, "Plain transcript");
}

#[tokio::test]
async fn whisper_blank_transcript_is_empty_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": ""})))
        .mount(&mock_server)
        .await;

    let provider = OpenAISpeechProvider::new(test_config(&mock_server.uri())).unwrap();
    let result = provider.transcribe(recording(), &api_key()).await;

    assert!(matches!(result, Err(SpeechError::EmptyResponse(_))));
}

#[tokio::test]
async fn whisper_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error",
                "code": "invalid_api_key"
            }
        })))
        .mount(&mock_server)
        .await;

    let provider = OpenAISpeechProvider::new(test_config(&mock_server.uri())).unwrap();
    let result = provider.transcribe(recording(), &api_key()).await;

    match result {
        Err(SpeechError::Unauthorized(message)) => {
            assert_eq!(message, "Incorrect API key provided");
        },
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn whisper_server_error_keeps_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .mount(&mock_server)
        .await;

    let provider = OpenAISpeechProvider::new(test_config(&mock_server.uri())).unwrap();
    let result = provider.transcribe(recording(), &api_key()).await;

    match result {
        Err(SpeechError::ServerError { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "upstream overloaded");
        },
        other => panic!("expected ServerError, got {other:?}"),
    }
}

#[tokio::test]
async fn whisper_rejects_empty_audio_without_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let provider = OpenAISpeechProvider::new(test_config(&mock_server.uri())).unwrap();
    let result = provider
        .transcribe(AudioClip::new(Vec::new(), AudioFormat::Mp4), &api_key())
        .await;

    assert!(matches!(result, Err(SpeechError::EmptyAudio)));
}

#[tokio::test]
async fn whisper_timeout_reports_configured_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"text": "late"}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let config = SpeechConfig {
        timeout_ms: 50,
        ..test_config(&mock_server.uri())
    };
    let provider = OpenAISpeechProvider::new(config).unwrap();
    let result = provider.transcribe(recording(), &api_key()).await;

    assert!(matches!(result, Err(SpeechError::Timeout(50))));
}

// ============ TTS ============

#[tokio::test]
async fn tts_synthesis_success() {
    let mock_server = MockServer::start().await;
    let audio = vec![0xFF, 0xFB, 0x90, 0x00, 0x01, 0x02];

    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .and(header("Authorization", "Bearer test-api-key"))
        .and(body_json(serde_json::json!({
            "model": "tts-1",
            "input": "Great job today!",
            "voice": "nova",
            "response_format": "mp3"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(audio.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = OpenAISpeechProvider::new(test_config(&mock_server.uri())).unwrap();
    let clip = provider
        .synthesize("Great job today!", None, &api_key())
        .await
        .unwrap();

    assert_eq!(clip.format(), AudioFormat::Mp3);
    assert_eq!(clip.data(), audio.as_slice());
}

#[tokio::test]
async fn tts_uses_voice_override_speed_and_format() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .and(body_partial_json(serde_json::json!({
            "voice": "alloy",
            "response_format": "opus",
            "speed": 1.5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x4F, 0x67, 0x67, 0x53]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = SpeechConfig {
        output_format: AudioFormat::Ogg,
        speed: 1.5,
        ..test_config(&mock_server.uri())
    };
    let provider = OpenAISpeechProvider::new(config).unwrap();
    let clip = provider
        .synthesize("Keep going", Some("alloy"), &api_key())
        .await
        .unwrap();

    assert_eq!(clip.format(), AudioFormat::Opus);
}

#[tokio::test]
async fn tts_rejects_blank_and_oversized_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let provider = OpenAISpeechProvider::new(test_config(&mock_server.uri())).unwrap();

    let blank = provider.synthesize("   ", None, &api_key()).await;
    assert!(matches!(blank, Err(SpeechError::SynthesisFailed(_))));

    let long_text = "a".repeat(4097);
    let long = provider.synthesize(&long_text, None, &api_key()).await;
    assert!(matches!(long, Err(SpeechError::SynthesisFailed(_))));
}

#[tokio::test]
async fn tts_empty_body_is_empty_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let provider = OpenAISpeechProvider::new(test_config(&mock_server.uri())).unwrap();
    let result = provider.synthesize("Hello", None, &api_key()).await;

    assert!(matches!(result, Err(SpeechError::EmptyResponse(_))));
}

#[tokio::test]
async fn tts_forbidden_is_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let provider = OpenAISpeechProvider::new(test_config(&mock_server.uri())).unwrap();
    let result = provider.synthesize("Hello", None, &api_key()).await;

    assert!(matches!(result, Err(SpeechError::Unauthorized(_))));
}

// ============ ElevenLabs ============

#[tokio::test]
async fn elevenlabs_transcription_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/speech-to-text"))
        .and(header("xi-api-key", "test-api-key"))
        .and(body_json(serde_json::json!({
            "audio": "AAAAGGZ0eXBtcDQyAAAAAA=="
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "text": "How was my form?",
            "language_code": "en"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transcriber = ElevenLabsTranscriber::new(&test_config(&mock_server.uri())).unwrap();
    let transcription = transcriber.transcribe(recording(), &api_key()).await.unwrap();

    assert_eq!(transcription.text, "How was my form?");
    assert_eq!(transcription.language.as_deref(), Some("en"));
}

#[tokio::test]
async fn elevenlabs_missing_text_is_empty_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/speech-to-text"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let transcriber = ElevenLabsTranscriber::new(&test_config(&mock_server.uri())).unwrap();
    let result = transcriber.transcribe(recording(), &api_key()).await;

    assert!(matches!(result, Err(SpeechError::EmptyResponse(_))));
}

#[tokio::test]
async fn elevenlabs_invalid_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/speech-to-text"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "detail": {"status": "invalid_api_key", "message": "Invalid API key"}
        })))
        .mount(&mock_server)
        .await;

    let transcriber = ElevenLabsTranscriber::new(&test_config(&mock_server.uri())).unwrap();
    let result = transcriber.transcribe(recording(), &api_key()).await;

    match result {
        Err(SpeechError::Unauthorized(message)) => assert_eq!(message, "Invalid API key"),
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn elevenlabs_connection_refused() {
    // Nothing listens on port 1
    let transcriber = ElevenLabsTranscriber::new(&test_config("http://127.0.0.1:1")).unwrap();
    let result = transcriber.transcribe(recording(), &api_key()).await;

    assert!(matches!(
        result,
        Err(SpeechError::ConnectionFailed(_) | SpeechError::RequestFailed(_))
    ));
}
