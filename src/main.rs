//! Local host harness: plays the chat runtime so the plugin can be driven
//! from a terminal or a script.

use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use model_toggle::plugin::editor::OsFamily;
use model_toggle::{ChatMessage, Host, HostError, PluginContext, SessionId, Settings, initialize};

/// Drive the model-toggle plugin without a chat runtime.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Messages to send, e.g. "/m" or "/model-toggle show". Reads stdin
    /// lines when omitted.
    #[arg(value_name = "MESSAGE")]
    messages: Vec<String>,

    /// JSON provider payload served as the model catalog
    #[arg(long, value_name = "FILE")]
    providers: Option<PathBuf>,

    /// Session id passed to model activation
    #[arg(long, default_value = "local")]
    session: String,

    /// Settings file to use instead of the per-user one
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Treat stdin lines as JSON chat messages instead of plain text
    #[arg(long)]
    json: bool,
}

/// Serves the catalog from a file and echoes activations.
struct LocalHost {
    providers: Option<PathBuf>,
}

impl Host for LocalHost {
    fn providers(&self) -> Result<Value, HostError> {
        let path = self
            .providers
            .as_ref()
            .ok_or_else(|| HostError::new("no provider catalog configured (pass --providers)"))?;
        let raw = fs::read_to_string(path)
            .map_err(|err| HostError::new(format!("{}: {err}", path.display())))?;
        serde_json::from_str(&raw).map_err(|err| HostError::new(format!("{}: {err}", path.display())))
    }

    fn set_session_model(&self, session: &SessionId, model: &str) -> Result<(), HostError> {
        tracing::info!(session = session.as_str(), model, "session.command model");
        println!("session.command model {model}");
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match cli.settings.as_deref() {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    // Initialize logging to file (never stdout)
    let log_dir = directories::ProjectDirs::from("", "", "model-toggle")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("model-toggle"));
    fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "model-toggle.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.general.log_filter));
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .init();

    tracing::info!("model-toggle harness starting");

    let home = directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or_else(|| anyhow!("cannot determine home directory"))?;
    let context = PluginContext::from_settings(&settings, &home, OsFamily::current());
    let handler = initialize(
        LocalHost {
            providers: cli.providers,
        },
        context,
    );

    let session = SessionId::new(cli.session);
    let emit = |message: ChatMessage| {
        for line in handler.handle(&message) {
            println!("{line}");
        }
    };

    if !cli.messages.is_empty() {
        for text in cli.messages {
            emit(ChatMessage::text(session.clone(), text));
        }
        return Ok(());
    }

    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let message = if cli.json {
            serde_json::from_str::<ChatMessage>(&line)
                .with_context(|| format!("invalid chat message: {line}"))?
        } else {
            ChatMessage::text(session.clone(), line)
        };
        emit(message);
    }

    Ok(())
}
