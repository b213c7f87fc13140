//! Error types for the Telegram bot.

use thiserror::Error;

/// Errors produced by the Telegram bot.
#[derive(Debug, Error)]
pub enum BotError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience alias.
pub type BotResult<T> = Result<T, BotError>;
