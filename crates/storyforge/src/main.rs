use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use storyforge_autosave::AutoSaveConfig;
use storyforge_core::{SessionHandle, StorySession};
use storyforge_logging::{init_tracing, LogFormat, Logger};

mod config;
mod demo;
mod repl;

use config::ProjectConfig;

#[derive(Parser, Debug)]
#[command(
    name = "storyforge",
    about = "User story drafting with version history and auto-save",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: ./storyforge.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Session event format
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormatChoice>,

    /// Tracing filter when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append session events to this JSON-lines file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Do not print session events to the console
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive editing session (default)
    Repl,
    /// Scripted session: generate, edit, auto-save, diff, restore
    Demo {
        /// Debounce to use instead of the configured one, in milliseconds
        #[arg(long, default_value_t = 500)]
        debounce_ms: u64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let project = match &cli.config {
        Some(path) => ProjectConfig::load_file(path)?,
        None => {
            let working_dir =
                std::env::current_dir().context("Failed to get current directory")?;
            ProjectConfig::discover(&working_dir)?
        }
    };

    // CLI flags win over the config file
    let log_format: LogFormat = cli
        .log_format
        .map(Into::into)
        .or(project.log_format)
        .unwrap_or_default();
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| project.log_level.clone())
        .unwrap_or_else(|| "warn".to_string());
    init_tracing(&log_level, log_format);

    let logger = match &cli.log_file {
        Some(path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    }
    .with_console(!cli.quiet);
    let logger = Arc::new(logger);

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => {
            let (handle, task) = spawn(project.autosave, logger);
            repl::run(handle).await?;
            task.await.context("Session task failed")?;
        }
        Commands::Demo { debounce_ms } => {
            let debounce = Duration::from_millis(debounce_ms);
            let (handle, task) = spawn(project.autosave.with_debounce(debounce), logger);
            demo::run(handle, debounce).await?;
            task.await.context("Session task failed")?;
        }
    }

    Ok(())
}

fn spawn(
    config: AutoSaveConfig,
    logger: Arc<Logger>,
) -> (SessionHandle, tokio::task::JoinHandle<StorySession>) {
    let mut session = StorySession::new(config, logger, tokio::time::Instant::now().into_std());
    session.on_notify(Arc::new(repl::print_notification));
    SessionHandle::spawn(session)
}
