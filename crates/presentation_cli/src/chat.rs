//! Interactive chat session

use std::{io::Write, path::PathBuf};

use application::{error::ApplicationError, services::TurnEvent};
use domain::{ConversationMessage, CredentialKind, Modality, TurnState};
use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::app::{App, load_recording};

const HELP: &str = "\
Commands:
  /voice <path>         send a recorded audio file
  /key <kind> <value>   store the completion or speech key
  /keys                 show which keys are stored
  /clear                start a new conversation
  /help                 show this help
  /quit                 leave the session";

/// One line typed into the chat session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    /// Text to send as a turn
    Message(String),
    /// Recording to send as a voice turn
    Voice(PathBuf),
    /// Store a credential
    SetKey {
        /// Which credential
        kind: CredentialKind,
        /// The key itself
        value: String,
    },
    /// Show credential status
    Keys,
    /// Empty the history
    Clear,
    Help,
    Quit,
    /// Nothing typed
    Empty,
}

/// Interpret a line; bare input is a message in text mode and a recording path in voice mode
pub fn parse_line(line: &str, mode: Modality) -> Result<ChatInput, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ChatInput::Empty);
    }

    let Some(command) = line
        .strip_prefix('/')
        .filter(|rest| !rest.split_whitespace().next().unwrap_or_default().contains('/'))
    else {
        return Ok(match mode {
            Modality::Text => ChatInput::Message(line.to_string()),
            Modality::Voice => ChatInput::Voice(PathBuf::from(line)),
        });
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, rest)| (name, rest.trim()));

    match name.to_lowercase().as_str() {
        "voice" if rest.is_empty() => Err("Usage: /voice <path>".to_string()),
        "voice" => Ok(ChatInput::Voice(PathBuf::from(rest))),
        "key" => {
            let (kind, value) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "Usage: /key <completion|speech> <value>".to_string())?;
            let kind = kind.parse::<CredentialKind>().map_err(|e| e.to_string())?;
            Ok(ChatInput::SetKey {
                kind,
                value: value.trim().to_string(),
            })
        },
        "keys" => Ok(ChatInput::Keys),
        "clear" => Ok(ChatInput::Clear),
        "help" | "?" => Ok(ChatInput::Help),
        "quit" | "exit" | "q" => Ok(ChatInput::Quit),
        other => Err(format!("Unknown command /{other}. Type /help for a list.")),
    }
}

/// Progress line shown while a turn is in flight
pub fn progress_line(state: &TurnState) -> Option<&'static str> {
    match state {
        TurnState::AwaitingTranscription => Some("🎙️  Transcribing..."),
        TurnState::AwaitingCompletion => Some("💭 Thinking..."),
        TurnState::AwaitingSynthesis => Some("🔊 Speaking..."),
        TurnState::Idle | TurnState::Error(_) => None,
    }
}

pub fn print_message(message: &ConversationMessage) {
    if message.is_from_user() {
        println!("🧑 {}", message.content);
    } else {
        println!("🤖 {}", message.content);
    }
}

/// Run the session until `/quit` or end of input
pub async fn run(app: &App, mode: Modality) -> anyhow::Result<()> {
    println!("💬 coachtalk ({mode} mode). Type /help for commands.");

    let mut events = app.orchestrator.subscribe();
    let progress = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(TurnEvent::StateChanged(state)) => {
                    if let Some(line) = progress_line(&state) {
                        println!("   {line}");
                    }
                },
                Ok(_) => {},
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "Progress events dropped"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_line(&line, mode) {
            Ok(ChatInput::Quit) => break,
            Ok(input) => handle(app, input).await,
            Err(usage) => println!("⚠️  {usage}"),
        }
    }

    progress.abort();
    println!("👋 Bye");
    Ok(())
}

async fn handle(app: &App, input: ChatInput) {
    let orchestrator = &app.orchestrator;
    match input {
        ChatInput::Empty | ChatInput::Quit => {},
        ChatInput::Help => println!("{HELP}"),
        ChatInput::Message(text) => match orchestrator.send_text_message(&text).await {
            Ok(reply) => print_message(&reply),
            Err(e) => report_failure(app, &e),
        },
        ChatInput::Voice(path) => {
            let audio = match load_recording(&path).await {
                Ok(audio) => audio,
                Err(e) => {
                    println!("❌ {e}");
                    return;
                },
            };
            match orchestrator.send_voice_message(audio).await {
                Ok(turn) => {
                    print_message(&turn.transcript);
                    print_message(&turn.reply);
                },
                Err(e) => report_failure(app, &e),
            }
        },
        ChatInput::SetKey { kind, value } => {
            if value.trim().is_empty() {
                println!("⚠️  The {} must not be empty.", kind.label());
                return;
            }
            match orchestrator
                .save_credential(kind, SecretString::from(value))
                .await
            {
                Ok(()) => println!("🔐 Stored the {}.", kind.label()),
                Err(e) => println!("❌ {}", e.user_message()),
            }
        },
        ChatInput::Keys => match app.credentials.status().await {
            Ok(statuses) => {
                for status in statuses {
                    crate::print_credential_status(&status);
                }
            },
            Err(e) => println!("❌ {}", e.user_message()),
        },
        ChatInput::Clear => match orchestrator.clear_history() {
            Ok(()) => println!("🧹 Conversation cleared."),
            Err(e) => println!("❌ {}", e.user_message()),
        },
    }
}

/// Show why the turn failed, then dismiss the error state
fn report_failure(app: &App, error: &ApplicationError) {
    println!("❌ {}", error.user_message());
    if app.orchestrator.turn_state().is_error() {
        app.orchestrator.clear_error();
    }
}
