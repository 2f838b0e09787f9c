//! File playback adapter - Implements PlaybackPort by writing clips to disk
//!
//! Each synthesized reply is written to the output directory. When a player
//! command is configured it is run with the file path as its last argument.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use application::{error::ApplicationError, ports::PlaybackPort};
use async_trait::async_trait;
use domain::AudioClip;
use parking_lot::RwLock;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// Playback sink that stores clips and optionally hands them to a player
#[derive(Debug)]
pub struct FilePlaybackAdapter {
    output_dir: PathBuf,
    player: Option<(String, Vec<String>)>,
    counter: AtomicU64,
    last_file: RwLock<Option<PathBuf>>,
}

impl FilePlaybackAdapter {
    /// Write clips into `output_dir` without playing them
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            player: None,
            counter: AtomicU64::new(0),
            last_file: RwLock::new(None),
        }
    }

    /// Run `program args... <file>` after each clip is written
    #[must_use]
    pub fn with_player(mut self, program: impl Into<String>, args: Vec<String>) -> Self {
        self.player = Some((program.into(), args));
        self
    }

    /// Path of the most recently written clip
    pub fn last_file(&self) -> Option<PathBuf> {
        self.last_file.read().clone()
    }

    fn next_path(&self, clip: &AudioClip) -> PathBuf {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis());
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        self.output_dir
            .join(clip.file_name(&format!("reply-{millis}-{seq}")))
    }

    async fn run_player(
        program: &str,
        args: &[String],
        file: &Path,
    ) -> Result<(), ApplicationError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        debug!(program, "Running audio player");

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ApplicationError::Playback(format!("Audio player '{program}' not found"))
            } else {
                ApplicationError::Playback(format!("Failed to run '{program}': {e}"))
            }
        })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(program, status = %output.status, "Audio player failed");
            Err(ApplicationError::Playback(format!(
                "'{program}' exited with {}: {}",
                output.status,
                stderr.trim()
            )))
        }
    }
}

#[async_trait]
impl PlaybackPort for FilePlaybackAdapter {
    #[instrument(skip(self, audio), fields(format = %audio.format(), size = audio.len()))]
    async fn play(&self, audio: AudioClip) -> Result<(), ApplicationError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| {
                ApplicationError::Playback(format!(
                    "Failed to create '{}': {e}",
                    self.output_dir.display()
                ))
            })?;

        let path = self.next_path(&audio);
        tokio::fs::write(&path, audio.data()).await.map_err(|e| {
            ApplicationError::Playback(format!("Failed to write '{}': {e}", path.display()))
        })?;
        debug!(path = %path.display(), "Reply audio written");
        *self.last_file.write() = Some(path.clone());

        if let Some((program, args)) = &self.player {
            Self::run_player(program, args, &path).await?;
        }
        Ok(())
    }
}
