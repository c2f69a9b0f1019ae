//! Main entry point for gembot.

use clap::Parser;
use gembot_bot::{BotError, BotResult, GemBot};
use gembot_common::init_logging;
use gembot_config::{ConfigLoader, CONFIG_PATH_VAR};
use std::path::PathBuf;
use tracing::{error, info};

/// Discord bot for Google Gemini.
#[derive(Debug, Parser)]
#[command(name = "gembot", version, about)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, env = CONFIG_PATH_VAR)]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> BotResult<()> {
    let args = Args::parse();

    let mut config = ConfigLoader::load(args.config.as_deref())?;
    if let Some(level) = args.log_level {
        config.logging.level = level.to_lowercase();
    }

    // Dropping the guard flushes the log file.
    let _guard = init_logging(&config.logging.to_logging_config())
        .map_err(|e| BotError::Logging(e.to_string()))?;

    info!(
        prefix = %config.discord.command_prefix,
        model = %config.gemini.text_model,
        "Starting gembot"
    );

    let bot = GemBot::new(config)?;
    if let Err(e) = bot.start().await {
        error!("Bot failed: {}", e);
        return Err(e);
    }

    Ok(())
}
