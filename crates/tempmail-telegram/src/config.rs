//! Configuration for the Telegram bot.
//!
//! Everything comes from the process environment; the supervisor passes
//! these variables through when it spawns the bot as a child process.

use crate::error::{BotError, BotResult};

/// Default base URL for the temp-mail API process.
const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Telegram bot configuration.
#[derive(Clone)]
pub struct BotConfig {
    /// Telegram Bot API token (from `@BotFather`).
    pub bot_token: String,
    /// Base URL of the temp-mail API.
    pub api_url: String,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl BotConfig {
    /// Load configuration from the process environment.
    ///
    /// - `BOT_TOKEN` → `bot_token` (required)
    /// - `API_URL` → `api_url` (default `http://localhost:8000`)
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Config`] when `BOT_TOKEN` is unset or empty;
    /// the bot refuses to start without it.
    pub fn from_env() -> BotResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an injected variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> BotResult<Self> {
        let bot_token = lookup("BOT_TOKEN")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                BotError::Config(
                    "BOT_TOKEN is required — get a token from @BotFather \
                     and set it in the environment"
                        .to_owned(),
                )
            })?;

        let api_url = lookup("API_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned());

        Ok(Self { bot_token, api_url })
    }
}
