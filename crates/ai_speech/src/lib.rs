//! AI Speech - Speech-to-Text and Text-to-Speech clients
//!
//! Provides traits and implementations for speech processing:
//! - `SpeechToText` - Transcribe audio to text (STT)
//! - `TextToSpeech` - Synthesize speech from text (TTS)
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the traits (ports)
//! - `providers` module contains concrete implementations (adapters)
//!
//! # Supported Providers
//!
//! - OpenAI Whisper (STT) and TTS API
//! - ElevenLabs speech-to-text (base64 JSON upload)
//!
//! The API key is passed on every call rather than held in configuration,
//! so a key change takes effect on the next turn.

pub mod config;
pub mod error;
pub mod ports;
pub mod providers;
pub mod types;

pub use config::{SpeechConfig, TranscriptionProvider};
pub use error::SpeechError;
pub use ports::{SpeechToText, TextToSpeech};
pub use providers::{ElevenLabsTranscriber, OpenAISpeechProvider};
pub use types::Transcription;
