//! Composition root: builds the orchestrator and its adapters from `AppConfig`

use std::{path::Path, sync::Arc};

use ai_speech::TranscriptionProvider;
use application::{
    ports::{CredentialStorePort, PlaybackPort},
    services::{ConversationOrchestrator, CredentialService},
};
use domain::{AudioClip, AudioFormat, CredentialKind};
use infrastructure::{
    AppConfig, CompletionAdapter, CredentialsAppConfig, EncryptedFileCredentialStore,
    FilePlaybackAdapter, InMemoryCredentialStore, PlaybackAppConfig, SynthesisAdapter,
    TranscriptionAdapter,
};
use tracing::{debug, info};

/// Everything a command needs, wired once per process
pub struct App {
    pub orchestrator: ConversationOrchestrator,
    pub credentials: CredentialService,
    pub playback: Arc<FilePlaybackAdapter>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("turn_state", &self.orchestrator.turn_state())
            .finish_non_exhaustive()
    }
}

impl App {
    /// Wire the adapters, seed demo credentials and build the orchestrator
    pub async fn build(config: &AppConfig) -> anyhow::Result<Self> {
        let store = build_store(&config.credentials).await?;
        let credentials = CredentialService::new(Arc::clone(&store));

        if credentials
            .seed_demo_credentials(config.credentials.demo_completion_key.as_ref())
            .await?
        {
            info!("Demo mode: using the configured completion key");
        }

        let completion = Arc::new(CompletionAdapter::new(config.completion.clone())?);
        let transcription = Arc::new(TranscriptionAdapter::new(&config.speech)?);

        // ElevenLabs keys only cover transcription; replies are still voiced by OpenAI
        let synthesis = match config.speech.transcription_provider {
            TranscriptionProvider::OpenAI => SynthesisAdapter::new(config.speech.clone())?,
            TranscriptionProvider::ElevenLabs => SynthesisAdapter::new(config.speech.clone())?
                .with_stored_key(Arc::clone(&store), CredentialKind::Completion),
        };

        let playback = Arc::new(build_playback(&config.playback));

        let orchestrator = ConversationOrchestrator::new(
            completion,
            transcription,
            Arc::new(synthesis),
            store,
            Arc::clone(&playback) as Arc<dyn PlaybackPort>,
        )
        .with_policy(config.orchestrator.credential_policy()?)
        .with_config(config.orchestrator.orchestrator_config());

        debug!(
            transcription = ?config.speech.transcription_provider,
            "Orchestrator ready"
        );

        Ok(Self {
            orchestrator,
            credentials,
            playback,
        })
    }
}

async fn build_store(
    config: &CredentialsAppConfig,
) -> anyhow::Result<Arc<dyn CredentialStorePort>> {
    if config.in_memory {
        debug!("Using in-memory credential store");
        return Ok(Arc::new(InMemoryCredentialStore::new()));
    }

    let path = config.resolved_store_path();
    let key_path = config.resolved_key_path();
    debug!(path = %path.display(), "Opening encrypted credential store");
    let store = EncryptedFileCredentialStore::open(path, key_path).await?;
    Ok(Arc::new(store))
}

fn build_playback(config: &PlaybackAppConfig) -> FilePlaybackAdapter {
    let adapter = FilePlaybackAdapter::new(config.resolved_output_dir());
    match &config.command {
        Some(command) => adapter.with_player(command.clone(), config.args.clone()),
        None => adapter,
    }
}

/// Read a recording from disk, taking its format from the file extension
pub async fn load_recording(path: &Path) -> anyhow::Result<AudioClip> {
    let format = recording_format(path)?;
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
    Ok(AudioClip::new(data, format))
}

fn recording_format(path: &Path) -> anyhow::Result<AudioFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(AudioFormat::from_extension)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Unsupported recording {}: expected an audio file such as .m4a, .mp3 or .wav",
                path.display()
            )
        })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use domain::TurnState;
    use tempfile::TempDir;

    use super::*;

    fn ephemeral_config(dir: &TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.credentials.in_memory = true;
        config.playback.output_dir = Some(dir.path().to_path_buf());
        config
    }

    #[test]
    fn recording_format_from_extension() {
        assert_eq!(
            recording_format(Path::new("take.m4a")).unwrap(),
            AudioFormat::M4a
        );
        assert_eq!(
            recording_format(Path::new("/tmp/TAKE.MP3")).unwrap(),
            AudioFormat::Mp3
        );
        assert!(recording_format(Path::new("notes.txt")).is_err());
        assert!(recording_format(Path::new("no_extension")).is_err());
    }

    #[tokio::test]
    async fn load_recording_reads_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("take.wav");
        std::fs::write(&path, b"RIFF").unwrap();

        let clip = load_recording(&path).await.unwrap();
        assert_eq!(clip.format(), AudioFormat::Wav);
        assert_eq!(clip.data(), b"RIFF");
    }

    #[tokio::test]
    async fn load_recording_missing_file() {
        let err = load_recording(&PathBuf::from("/nonexistent/take.wav"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Cannot read"));
    }

    #[tokio::test]
    async fn build_with_in_memory_store() {
        let dir = TempDir::new().unwrap();
        let app = App::build(&ephemeral_config(&dir)).await.unwrap();

        assert_eq!(app.orchestrator.turn_state(), TurnState::Idle);
        assert!(app.orchestrator.history().is_empty());
        assert!(!app.credentials.has_all(&CredentialKind::ALL).await.unwrap());
    }

    #[tokio::test]
    async fn build_seeds_demo_key() {
        let dir = TempDir::new().unwrap();
        let mut config = ephemeral_config(&dir);
        config.credentials.demo_completion_key = Some("sk-demo-1234".into());

        let app = App::build(&config).await.unwrap();

        assert!(
            app.credentials
                .has_all(&[CredentialKind::Completion])
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn build_with_encrypted_store_creates_key() {
        let dir = TempDir::new().unwrap();
        let mut config = ephemeral_config(&dir);
        config.credentials.in_memory = false;
        config.credentials.store_path = Some(dir.path().join("credentials.json"));
        config.credentials.key_path = Some(dir.path().join("credentials.key"));

        let app = App::build(&config).await.unwrap();
        app.credentials
            .set(CredentialKind::Speech, "sk-speech-key")
            .await
            .unwrap();

        assert!(dir.path().join("credentials.key").exists());
        assert!(dir.path().join("credentials.json").exists());
    }

    #[tokio::test]
    async fn build_rejects_loose_policy() {
        let dir = TempDir::new().unwrap();
        let mut config = ephemeral_config(&dir);
        config.orchestrator.text_requires = vec![];

        assert!(App::build(&config).await.is_err());
    }
}
