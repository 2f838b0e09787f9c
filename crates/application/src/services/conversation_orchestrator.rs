//! Conversation orchestrator - Drives text and voice turns
//!
//! A text turn appends the user's message, asks the completion service for a
//! reply and appends it. A voice turn runs:
//! 1. Transcribe the recording (STT)
//! 2. Append the transcript and ask the completion service for a reply
//! 3. Append the reply and synthesize it (TTS)
//! 4. Hand the synthesized audio to playback
//!
//! The first failing step ends the turn. Messages appended before the failure
//! stay in the history.

use std::{collections::HashMap, fmt, future::Future, sync::Arc, time::Duration};

use domain::{
    AudioClip, Conversation, ConversationMessage, CredentialKind, DomainError, MessageOrigin,
    Modality, TurnState,
};
use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex, MutexGuard, broadcast};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{
        CompletionPort, CredentialStorePort, HistoryEntry, PlaybackPort, SynthesisPort,
        TranscriptionPort,
    },
    services::CredentialPolicy,
};

/// Notification published while turns progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    /// The live turn state changed
    StateChanged(TurnState),
    /// A message was appended to the history
    MessageAppended(ConversationMessage),
    /// A turn was refused before it started; state and history are unchanged
    Rejected {
        /// User-visible reason
        reason: String,
    },
    /// The history was emptied
    HistoryCleared,
}

/// Configuration for the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Upper bound for each external call
    pub call_timeout: Duration,
    /// Buffered events per subscriber before slow receivers lag
    pub event_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(30),
            event_capacity: 64,
        }
    }
}

/// Messages appended by a successful voice turn
#[derive(Debug, Clone)]
pub struct VoiceTurn {
    /// The transcript, stored as a USER/VOICE message
    pub transcript: ConversationMessage,
    /// The reply, stored as an ASSISTANT/VOICE message
    pub reply: ConversationMessage,
}

/// Drives one conversation, one turn at a time
pub struct ConversationOrchestrator {
    completion: Arc<dyn CompletionPort>,
    transcription: Arc<dyn TranscriptionPort>,
    synthesis: Arc<dyn SynthesisPort>,
    credentials: Arc<dyn CredentialStorePort>,
    playback: Arc<dyn PlaybackPort>,
    policy: CredentialPolicy,
    config: OrchestratorConfig,
    conversation: RwLock<Conversation>,
    state: RwLock<TurnState>,
    turn_gate: Mutex<()>,
    events: broadcast::Sender<TurnEvent>,
}

impl fmt::Debug for ConversationOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationOrchestrator")
            .field("policy", &self.policy)
            .field("config", &self.config)
            .field("messages", &self.conversation.read().len())
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

impl ConversationOrchestrator {
    /// Create an orchestrator with the default policy and configuration
    pub fn new(
        completion: Arc<dyn CompletionPort>,
        transcription: Arc<dyn TranscriptionPort>,
        synthesis: Arc<dyn SynthesisPort>,
        credentials: Arc<dyn CredentialStorePort>,
        playback: Arc<dyn PlaybackPort>,
    ) -> Self {
        let config = OrchestratorConfig::default();
        let (events, _) = broadcast::channel(config.event_capacity);
        Self {
            completion,
            transcription,
            synthesis,
            credentials,
            playback,
            policy: CredentialPolicy::default(),
            config,
            conversation: RwLock::new(Conversation::new()),
            state: RwLock::new(TurnState::Idle),
            turn_gate: Mutex::new(()),
            events,
        }
    }

    /// Replace the credential policy
    #[must_use]
    pub fn with_policy(mut self, policy: CredentialPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the configuration
    ///
    /// A different `event_capacity` needs a new channel, which closes receivers
    /// obtained from [`Self::subscribe`] before this call. Configure first, then subscribe.
    #[must_use]
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        if config.event_capacity.max(1) != self.config.event_capacity.max(1) {
            let (events, _) = broadcast::channel(config.event_capacity.max(1));
            self.events = events;
        }
        self.config = config;
        self
    }

    /// Snapshot of the history, oldest first
    pub fn history(&self) -> Vec<ConversationMessage> {
        self.conversation.read().messages().to_vec()
    }

    /// Current turn state
    pub fn turn_state(&self) -> TurnState {
        self.state.read().clone()
    }

    /// Receive turn notifications from now on
    pub fn subscribe(&self) -> broadcast::Receiver<TurnEvent> {
        self.events.subscribe()
    }

    /// Run a text turn
    ///
    /// Returns the assistant's reply. Blank input or a missing credential is
    /// refused without touching history or state.
    #[instrument(skip(self, input), fields(input_len = input.len()))]
    pub async fn send_text_message(
        &self,
        input: &str,
    ) -> Result<ConversationMessage, ApplicationError> {
        let _turn = self.begin_turn()?;

        if input.trim().is_empty() {
            return Err(self.reject(ApplicationError::EmptyInput));
        }
        let mut credentials = self
            .load_credentials(Modality::Text)
            .await
            .map_err(|e| self.reject(e))?;
        let completion_key = take_credential(&mut credentials, CredentialKind::Completion)?;

        info!("Starting text turn");
        self.append(MessageOrigin::User, Modality::Text, input);

        let reply = self
            .request_completion(&completion_key)
            .await
            .map_err(|e| self.fail(e))?;

        let message = self.append(MessageOrigin::Assistant, Modality::Text, reply);
        self.set_state(TurnState::Idle);
        info!("Text turn complete");
        Ok(message)
    }

    /// Run a voice turn
    ///
    /// Returns the appended transcript and reply. The synthesized reply has
    /// been handed to playback when this returns `Ok`.
    #[instrument(skip(self, audio), fields(audio_size = audio.len(), format = %audio.format()))]
    pub async fn send_voice_message(&self, audio: AudioClip) -> Result<VoiceTurn, ApplicationError> {
        let _turn = self.begin_turn()?;

        if audio.is_empty() {
            return Err(self.reject(ApplicationError::EmptyInput));
        }
        let mut credentials = self
            .load_credentials(Modality::Voice)
            .await
            .map_err(|e| self.reject(e))?;
        let completion_key = take_credential(&mut credentials, CredentialKind::Completion)?;
        let speech_key = take_credential(&mut credentials, CredentialKind::Speech)?;

        // Step 1: Transcribe
        info!("Starting voice turn transcription");
        self.set_state(TurnState::AwaitingTranscription);
        let transcript = self
            .with_timeout(self.transcription.transcribe(audio, &speech_key))
            .await
            .and_then(|text| non_blank(text, "transcription service"))
            .map_err(|e| self.fail(e))?;
        debug!(transcript_len = transcript.len(), "Transcription complete");
        let transcript = self.append(MessageOrigin::User, Modality::Voice, transcript);

        // Step 2: Completion over the history including the transcript
        let reply = self
            .request_completion(&completion_key)
            .await
            .map_err(|e| self.fail(e))?;
        let reply = self.append(MessageOrigin::Assistant, Modality::Voice, reply);

        // Step 3: Synthesize and hand off to playback
        self.set_state(TurnState::AwaitingSynthesis);
        let audio = self
            .with_timeout(self.synthesis.synthesize(&reply.content, &speech_key))
            .await
            .map_err(|e| self.fail(e))?;
        debug!(audio_size = audio.len(), "Synthesis complete");

        self.playback.play(audio).await.map_err(|e| self.fail(e))?;

        self.set_state(TurnState::Idle);
        info!("Voice turn complete");
        Ok(VoiceTurn { transcript, reply })
    }

    /// Empty the history
    ///
    /// Refused while a turn is in flight.
    pub fn clear_history(&self) -> Result<(), ApplicationError> {
        let _turn = self.begin_turn()?;
        self.conversation.write().clear();
        self.emit(TurnEvent::HistoryCleared);
        info!("Conversation history cleared");
        Ok(())
    }

    /// Return an `error` state to `idle`; other states are left alone
    pub fn clear_error(&self) {
        let cleared = {
            let mut state = self.state.write();
            if state.is_error() {
                *state = TurnState::Idle;
                true
            } else {
                false
            }
        };
        if cleared {
            self.emit(TurnEvent::StateChanged(TurnState::Idle));
        }
    }

    /// Store a credential once no turn is in flight
    ///
    /// Surrounding whitespace is trimmed; a blank value is refused.
    #[instrument(skip(self, value))]
    pub async fn save_credential(
        &self,
        kind: CredentialKind,
        value: SecretString,
    ) -> Result<(), ApplicationError> {
        let trimmed = value.expose_secret().trim();
        if trimmed.is_empty() {
            return Err(DomainError::ValidationError(format!("{} is empty", kind.label())).into());
        }
        let value = SecretString::from(trimmed);

        let _turn = self.turn_gate.lock().await;
        self.credentials.save(kind, value).await
    }

    /// Remove every stored credential once no turn is in flight
    #[instrument(skip(self))]
    pub async fn clear_credentials(&self) -> Result<(), ApplicationError> {
        let _turn = self.turn_gate.lock().await;
        self.credentials.clear().await
    }

    fn begin_turn(&self) -> Result<MutexGuard<'_, ()>, ApplicationError> {
        self.turn_gate
            .try_lock()
            .map_err(|_| self.reject(ApplicationError::TurnInProgress))
    }

    async fn load_credentials(
        &self,
        modality: Modality,
    ) -> Result<HashMap<CredentialKind, SecretString>, ApplicationError> {
        let mut found = HashMap::new();
        for kind in self.policy.required_for(modality) {
            match self.credentials.get(*kind).await? {
                Some(value) if !value.expose_secret().trim().is_empty() => {
                    found.insert(*kind, value);
                },
                _ => return Err(ApplicationError::MissingCredential(*kind)),
            }
        }
        Ok(found)
    }

    async fn request_completion(
        &self,
        credential: &SecretString,
    ) -> Result<String, ApplicationError> {
        let history = HistoryEntry::from_messages(self.conversation.read().messages());
        self.set_state(TurnState::AwaitingCompletion);
        debug!(history_len = history.len(), "Requesting completion");

        self.with_timeout(self.completion.complete(history, credential))
            .await
            .and_then(|text| non_blank(text, "completion service"))
    }

    async fn with_timeout<T>(
        &self,
        call: impl Future<Output = Result<T, ApplicationError>>,
    ) -> Result<T, ApplicationError> {
        tokio::time::timeout(self.config.call_timeout, call)
            .await
            .map_err(|_| {
                ApplicationError::Timeout(
                    u64::try_from(self.config.call_timeout.as_millis()).unwrap_or(u64::MAX),
                )
            })?
    }

    fn append(
        &self,
        origin: MessageOrigin,
        modality: Modality,
        content: impl Into<String>,
    ) -> ConversationMessage {
        let message = self
            .conversation
            .write()
            .append(origin, modality, content)
            .clone();
        self.emit(TurnEvent::MessageAppended(message.clone()));
        message
    }

    fn set_state(&self, state: TurnState) {
        *self.state.write() = state.clone();
        self.emit(TurnEvent::StateChanged(state));
    }

    fn fail(&self, error: ApplicationError) -> ApplicationError {
        warn!(error = %error, "Turn failed");
        self.set_state(TurnState::Error(error.user_message()));
        error
    }

    fn reject(&self, error: ApplicationError) -> ApplicationError {
        debug!(error = %error, "Turn rejected");
        self.emit(TurnEvent::Rejected {
            reason: error.user_message(),
        });
        error
    }

    fn emit(&self, event: TurnEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn take_credential(
    credentials: &mut HashMap<CredentialKind, SecretString>,
    kind: CredentialKind,
) -> Result<SecretString, ApplicationError> {
    credentials
        .remove(&kind)
        .ok_or(ApplicationError::MissingCredential(kind))
}

fn non_blank(text: String, service: &str) -> Result<String, ApplicationError> {
    if text.trim().is_empty() {
        Err(ApplicationError::EmptyResponse(service.to_string()))
    } else {
        Ok(text)
    }
}
