//! Clerk CLI
//!
//! Command-line entry point for the store assistant: ask one-off questions,
//! hold an interactive chat, and manage the document index.

mod commands;

use clap::{Parser, Subcommand};
use clerk_core::{config::AppConfig, logging, AppResult};
use commands::{AskCommand, ChatCommand, IngestCommand, StatsCommand};
use std::path::PathBuf;

/// Clerk - retrieval-augmented assistant for store policies and procedures
#[derive(Parser, Debug)]
#[command(name = "clerk")]
#[command(about = "Retrieval-augmented assistant for store policies and procedures", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "CLERK_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "CLERK_CONFIG")]
    config: Option<PathBuf>,

    /// Model identifier
    #[arg(short, long, global = true, env = "CLERK_MODEL")]
    model: Option<String>,

    /// Model endpoint URL
    #[arg(short, long, global = true, env = "CLERK_ENDPOINT")]
    endpoint: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a single question
    Ask(AskCommand),

    /// Interactive chat session
    Chat(ChatCommand),

    /// Ingest documents into the index
    Ingest(IngestCommand),

    /// Show index statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.model,
        cli.endpoint,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Clerk CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Model: {}", config.chat.model);
    tracing::debug!("Endpoint: {}", config.chat.endpoint);

    config.ensure_clerk_dir()?;

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Ingest(_) => "ingest",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
