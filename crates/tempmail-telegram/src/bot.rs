//! Teloxide bot setup, dispatcher, and handler registration.

use std::sync::Arc;

use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use tracing::info;

use tempmail_client::TempMailClient;

use crate::config::BotConfig;
use crate::handler::{self, BotState};
use crate::session::SessionStore;

/// Build `BotState` and the teloxide handler tree from a config and API
/// client.
fn build_state_and_handler(
    config: &BotConfig,
    client: TempMailClient,
) -> (
    BotState,
    Bot,
    teloxide::dispatching::UpdateHandler<anyhow::Error>,
) {
    let bot = Bot::new(&config.bot_token);

    let state = BotState {
        client: Arc::new(client),
        sessions: SessionStore::new(),
    };

    let message_handler = Update::filter_message().endpoint({
        let state = state.clone();
        move |bot: Bot, msg: Message| {
            let state = state.clone();
            async move { handler::handle_message(bot, msg, state).await }
        }
    });

    let callback_handler = Update::filter_callback_query().endpoint({
        let state = state.clone();
        move |bot: Bot, query: CallbackQuery| {
            let state = state.clone();
            async move { handler::handle_callback(bot, query, state).await }
        }
    });

    let handler = dptree::entry()
        .branch(message_handler)
        .branch(callback_handler);

    (state, bot, handler)
}

/// Run the Telegram bot until shutdown.
///
/// Sets up a Ctrl+C handler and polls for updates until the process is
/// asked to stop.
///
/// # Errors
///
/// Returns an error if the API base URL in `config` is invalid.
pub async fn run(config: BotConfig) -> anyhow::Result<()> {
    let client = TempMailClient::new(&config.api_url)?;
    info!(api_url = %config.api_url, "Using temp-mail API");

    let (_state, bot, handler) = build_state_and_handler(&config, client);

    info!("Starting Telegram bot...");
    Box::pin(
        Dispatcher::builder(bot, handler)
            .enable_ctrlc_handler()
            .build()
            .dispatch(),
    )
    .await;

    info!("Bot stopped");
    Ok(())
}
