//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use doclens_core::config;
use doclens_core::logging;
use doclens_core::providers::gemini::GeminiClient;
use doclens_core::session::Session;

use crate::modes;

mod commands;

#[derive(Parser)]
#[command(name = "doclens")]
#[command(version)]
#[command(about = "Upload PDF documents and ask Gemini about them")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the model from config
    #[arg(short, long, global = true, env = "DOCLENS_MODEL")]
    model: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Upload up to three PDFs and ask one question about them
    Ask {
        /// PDF document to upload (repeat up to three times)
        #[arg(short, long = "file", value_name = "PDF", required = true)]
        files: Vec<PathBuf>,

        /// The question to ask about the documents
        #[arg(short, long)]
        prompt: String,
    },
    /// Manage files stored in the Gemini Files API
    Files {
        #[command(subcommand)]
        command: FilesCommands,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum FilesCommands {
    /// List all remote files
    List,
    /// Delete one remote file
    Delete {
        /// The file ID (last segment of its URI)
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Delete every remote file
    DeleteAll,
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = match logging::init(&config::paths::logs_dir()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: logging disabled: {e:#}");
            None
        }
    };

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli { command, model } = cli;

    match command {
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
        Some(Commands::Ask { files, prompt }) => {
            let session = open_session(model.as_deref())?;
            commands::ask::run(session, &files, &prompt).await
        }
        Some(Commands::Files { command }) => {
            let session = open_session(model.as_deref())?;
            match command {
                FilesCommands::List => commands::files::list(&session).await,
                FilesCommands::Delete { id } => commands::files::delete(session, &id).await,
                FilesCommands::DeleteAll => commands::files::delete_all(session).await,
            }
        }
        // default to the interactive session
        None => modes::run_interactive_session(open_session(model.as_deref())?).await,
    }
}

fn open_session(model_override: Option<&str>) -> Result<Session<GeminiClient>> {
    let mut config = config::Config::load().context("load config")?;
    if let Some(model) = model_override.map(str::trim).filter(|m| !m.is_empty()) {
        config.model = model.to_string();
    }

    let gemini_config = config.gemini_config().context("configure Gemini")?;
    tracing::info!(model = %gemini_config.model, base_url = %gemini_config.base_url, "session start");
    Ok(Session::new(GeminiClient::new(gemini_config)))
}
