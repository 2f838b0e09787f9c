//! coachtalk CLI
//!
//! Talk to a coaching assistant by text or recorded speech.

#![allow(clippy::print_stdout)]

mod app;
mod chat;

use std::path::PathBuf;

use application::services::CredentialStatus;
use clap::{Parser, Subcommand};
use domain::{CredentialKind, Modality};
use infrastructure::{AppConfig, init_telemetry};

use crate::app::{App, load_recording};

/// coachtalk CLI
#[derive(Parser)]
#[command(name = "coachtalk")]
#[command(author, version, about = "Conversational coaching client", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: ./coachtalk.toml if present)
    #[arg(short, long, env = "COACHTALK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive conversation
    Chat {
        /// Conversation mode: bare input is typed text or a recording path
        #[arg(short, long, default_value = "text")]
        mode: Modality,
    },

    /// Send a single text message and print the reply
    Send {
        /// Message to send
        message: String,
    },

    /// Send a recorded audio file and play the spoken reply
    ///
    /// The format is taken from the file extension (m4a, mp3, wav, ...).
    Voice {
        /// Recording to send
        path: PathBuf,
    },

    /// Manage stored API keys
    Credentials {
        #[command(subcommand)]
        action: CredentialsCommand,
    },
}

#[derive(Subcommand)]
enum CredentialsCommand {
    /// Store a key
    ///
    /// Example: coachtalk credentials set completion sk-...
    Set {
        /// Which key: completion or speech
        kind: CredentialKind,

        /// The key value
        #[arg(env = "COACHTALK_KEY_VALUE", hide_env_values = true)]
        value: String,
    },

    /// Show which keys are stored
    Status,

    /// Remove every stored key
    Clear,
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

fn print_credential_status(status: &CredentialStatus) {
    match (&status.preview, status.configured) {
        (Some(preview), true) => println!("✅ {}: {preview}", status.kind.label()),
        _ => println!("❌ {}: not set", status.kind.label()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let telemetry = match log_filter_from_verbosity(cli.verbose) {
        Some(filter) => config.telemetry.clone().with_log_filter(filter),
        None => config.telemetry.clone(),
    };
    init_telemetry(&telemetry)?;

    let app = App::build(&config).await?;

    match cli.command {
        Commands::Chat { mode } => chat::run(&app, mode).await?,

        Commands::Send { message } => match app.orchestrator.send_text_message(&message).await {
            Ok(reply) => println!("{}", reply.content),
            Err(e) => {
                println!("❌ {}", e.user_message());
                std::process::exit(1);
            },
        },

        Commands::Voice { path } => {
            let audio = load_recording(&path).await?;
            match app.orchestrator.send_voice_message(audio).await {
                Ok(turn) => {
                    chat::print_message(&turn.transcript);
                    chat::print_message(&turn.reply);
                    if let Some(file) = app.playback.last_file() {
                        println!("🔈 Reply audio: {}", file.display());
                    }
                },
                Err(e) => {
                    println!("❌ {}", e.user_message());
                    std::process::exit(1);
                },
            }
        },

        Commands::Credentials { action } => match action {
            CredentialsCommand::Set { kind, value } => {
                app.credentials.set(kind, &value).await?;
                println!("🔐 Stored the {}.", kind.label());
            },
            CredentialsCommand::Status => {
                for status in app.credentials.status().await? {
                    print_credential_status(&status);
                }
            },
            CredentialsCommand::Clear => {
                app.credentials.clear().await?;
                println!("🧹 All keys removed.");
            },
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_verbosity_zero_keeps_config() {
        assert_eq!(log_filter_from_verbosity(0), None);
    }

    #[test]
    fn log_filter_verbosity_one() {
        assert_eq!(log_filter_from_verbosity(1), Some("info"));
    }

    #[test]
    fn log_filter_verbosity_two() {
        assert_eq!(log_filter_from_verbosity(2), Some("debug"));
    }

    #[test]
    fn log_filter_verbosity_three_or_more() {
        assert_eq!(log_filter_from_verbosity(3), Some("trace"));
        assert_eq!(log_filter_from_verbosity(10), Some("trace"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn chat_mode_parses_modality() {
        let cli = Cli::try_parse_from(["coachtalk", "chat", "--mode", "voice"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Chat {
                mode: Modality::Voice
            }
        ));
    }

    #[test]
    fn credentials_set_parses_kind() {
        let cli =
            Cli::try_parse_from(["coachtalk", "credentials", "set", "speech", "sk-123"]).unwrap();
        match cli.command {
            Commands::Credentials {
                action: CredentialsCommand::Set { kind, value },
            } => {
                assert_eq!(kind, CredentialKind::Speech);
                assert_eq!(value, "sk-123");
            },
            _ => panic!("Expected credentials set"),
        }
    }

    #[test]
    fn unknown_credential_kind_is_rejected() {
        assert!(
            Cli::try_parse_from(["coachtalk", "credentials", "set", "billing", "x"]).is_err()
        );
    }
}
