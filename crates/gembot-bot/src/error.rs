//! Application-wide error types using thiserror.

use gembot_config::ConfigError;
use gembot_gate::StorageError;
use poise::serenity_prelude as serenity;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum BotError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Shared-layer failure such as building the HTTP client.
    #[error(transparent)]
    Common(#[from] gembot_common::GembotError),

    /// Persisted conversations could not be read.
    #[error("Conversation storage error: {0}")]
    Storage(#[from] StorageError),

    /// Discord/Serenity error.
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(String),
}

/// Result type for the bot application.
pub type BotResult<T> = Result<T, BotError>;
