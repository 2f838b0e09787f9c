//! Audio formats and recorded audio clips

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Container formats the client can send or receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MPEG-4 container (Android recorder output)
    Mp4,
    /// M4A/AAC container
    M4a,
    /// Raw AAC stream
    Aac,
    /// MP3
    Mp3,
    /// WAV (uncompressed)
    Wav,
    /// WebM (browser recorder output)
    Webm,
    /// OGG container
    Ogg,
    /// Opus in OGG
    Opus,
    /// FLAC (lossless)
    Flac,
}

impl AudioFormat {
    /// MIME type for this format
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp4 => "audio/mp4",
            Self::M4a => "audio/m4a",
            Self::Aac => "audio/aac",
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::Webm => "audio/webm",
            Self::Ogg => "audio/ogg",
            Self::Opus => "audio/opus",
            Self::Flac => "audio/flac",
        }
    }

    /// File extension for this format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::M4a => "m4a",
            Self::Aac => "aac",
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Webm => "webm",
            Self::Ogg => "ogg",
            Self::Opus => "opus",
            Self::Flac => "flac",
        }
    }

    /// Guess the format from a file extension (with or without a leading dot)
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "mp4" => Some(Self::Mp4),
            "m4a" => Some(Self::M4a),
            "aac" => Some(Self::Aac),
            "mp3" | "mpga" | "mpeg" => Some(Self::Mp3),
            "wav" | "wave" => Some(Self::Wav),
            "webm" => Some(Self::Webm),
            "ogg" | "oga" => Some(Self::Ogg),
            "opus" => Some(Self::Opus),
            "flac" => Some(Self::Flac),
            _ => None,
        }
    }

    /// Parse from a MIME type, ignoring parameters such as `codecs=`
    #[must_use]
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let base = mime.split(';').next().unwrap_or(mime).trim();
        match base {
            "audio/mp4" | "video/mp4" => Some(Self::Mp4),
            "audio/m4a" | "audio/x-m4a" => Some(Self::M4a),
            "audio/aac" => Some(Self::Aac),
            "audio/mpeg" | "audio/mp3" => Some(Self::Mp3),
            "audio/wav" | "audio/x-wav" | "audio/wave" => Some(Self::Wav),
            "audio/webm" => Some(Self::Webm),
            "audio/ogg" if mime.contains("codecs=opus") => Some(Self::Opus),
            "audio/ogg" => Some(Self::Ogg),
            "audio/opus" => Some(Self::Opus),
            "audio/flac" | "audio/x-flac" => Some(Self::Flac),
            _ => None,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s)
            .or_else(|| Self::from_mime_type(s))
            .ok_or_else(|| DomainError::UnsupportedAudioFormat(s.to_string()))
    }
}

/// An encoded audio clip, either recorded by the user or synthesized
#[derive(Clone, PartialEq, Eq)]
pub struct AudioClip {
    data: Vec<u8>,
    format: AudioFormat,
}

impl AudioClip {
    /// Wrap encoded bytes in the given format
    #[must_use]
    pub const fn new(data: Vec<u8>, format: AudioFormat) -> Self {
        Self { data, format }
    }

    /// Encoded bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the clip and return its bytes
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Container format
    #[must_use]
    pub const fn format(&self) -> AudioFormat {
        self.format
    }

    /// Size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the clip carries no audio at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Suggested file name, e.g. `recording.mp4`
    #[must_use]
    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.format.extension())
    }
}

// Audio payloads can be megabytes; print the shape, not the bytes.
impl fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioClip")
            .field("format", &self.format)
            .field("len", &self.data.len())
            .finish()
    }
}
