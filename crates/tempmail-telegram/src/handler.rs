//! Update dispatcher: maps commands and button presses to the generate /
//! check / copy flows.
//!
//! Each flow performs at most one outbound API call and finishes before the
//! reply is sent; errors are rendered for the user, never retried.

use std::sync::Arc;

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{ParseMode, UserId};
use tracing::{info, warn};

use tempmail_client::TempMailClient;
use tempmail_core::MailboxKind;

use crate::format;
use crate::session::SessionStore;
use crate::trigger::Trigger;

/// Shared bot state passed to all handlers.
#[derive(Clone)]
pub struct BotState {
    pub client: Arc<TempMailClient>,
    pub sessions: SessionStore,
}

/// Handle an incoming text message.
pub async fn handle_message(bot: Bot, msg: Message, state: BotState) -> anyhow::Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    // Sessions are keyed by user; without a sender there is nothing to do.
    let Some(user) = &msg.from else {
        return Ok(());
    };
    if !text.starts_with('/') {
        return Ok(());
    }

    let chat_id = msg.chat.id;
    let cmd = text.split_whitespace().next().unwrap_or("");

    match cmd {
        "/start" => {
            let _ = bot
                .send_message(chat_id, format::welcome_text(&user.first_name))
                .parse_mode(ParseMode::Html)
                .reply_markup(format::welcome_keyboard())
                .await;
        },
        "/help" => {
            let _ = bot
                .send_message(chat_id, format::help_text())
                .parse_mode(ParseMode::Html)
                .await;
        },
        "/gen" => generate_email(&bot, chat_id, user.id, MailboxKind::Regular, &state).await,
        "/tenmin" => generate_email(&bot, chat_id, user.id, MailboxKind::TenMinute, &state).await,
        "/edu" => generate_email(&bot, chat_id, user.id, MailboxKind::Edu, &state).await,
        "/check" => {
            let email = text.split_whitespace().nth(1);
            check_messages(&bot, chat_id, user.id, email, &state).await;
        },
        _ => {
            let _ = bot
                .send_message(chat_id, "Unknown command. Try /help.")
                .await;
        },
    }

    Ok(())
}

/// Handle an inline-button press.
///
/// Every press is acknowledged immediately so the client stops its spinner,
/// then the trigger is dispatched like the matching command.
pub async fn handle_callback(bot: Bot, query: CallbackQuery, state: BotState) -> anyhow::Result<()> {
    let _ = bot.answer_callback_query(&query.id).await;

    let Some(data) = query.data.as_deref() else {
        return Ok(());
    };
    let Some(message) = &query.message else {
        // Without the originating message there is no chat to reply into.
        return Ok(());
    };
    let chat_id = message.chat().id;
    let user_id = query.from.id;

    match Trigger::parse(data) {
        Some(Trigger::Generate(kind)) => {
            generate_email(&bot, chat_id, user_id, kind, &state).await;
        },
        Some(Trigger::CheckAll) => {
            check_messages(&bot, chat_id, user_id, None, &state).await;
        },
        Some(Trigger::Check(email)) => {
            check_messages(&bot, chat_id, user_id, Some(&email), &state).await;
        },
        Some(Trigger::Copy(email)) => {
            let _ = bot
                .edit_message_text(chat_id, message.id(), format::copied_text(&email))
                .parse_mode(ParseMode::Html)
                .await;
        },
        None => {
            warn!(data, "Ignoring unknown callback trigger");
        },
    }

    Ok(())
}

/// Generate a mailbox of `kind` and record the session on success.
async fn generate_email(
    bot: &Bot,
    chat_id: ChatId,
    user_id: UserId,
    kind: MailboxKind,
    state: &BotState,
) {
    let placeholder = match bot
        .send_message(chat_id, "🔄 Generating your temporary email...")
        .await
    {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to send placeholder: {e}");
            return;
        },
    };

    match state.client.generate(kind).await {
        Ok(mailbox) => {
            state
                .sessions
                .insert(
                    user_id,
                    mailbox.address.clone(),
                    mailbox.access_token.clone(),
                    kind,
                )
                .await;
            info!(user = user_id.0, kind = %kind, "Generated mailbox");

            let _ = bot
                .edit_message_text(chat_id, placeholder.id, format::generated_text(&mailbox))
                .parse_mode(ParseMode::Html)
                .reply_markup(format::generated_keyboard(&mailbox.address, kind))
                .await;
        },
        Err(e) => {
            warn!(kind = %kind, "Generate call failed: {e}");
            let _ = bot
                .edit_message_text(chat_id, placeholder.id, format::generate_error_text(&e))
                .await;
        },
    }
}

/// List a user's mailboxes, or fetch the inbox for one of them.
///
/// Only the single-mailbox path talks to the API; the list path and both
/// user-state errors are answered locally.
async fn check_messages(
    bot: &Bot,
    chat_id: ChatId,
    user_id: UserId,
    email: Option<&str>,
    state: &BotState,
) {
    if state.sessions.is_empty(user_id).await {
        let _ = bot.send_message(chat_id, format::NO_SESSIONS_TEXT).await;
        return;
    }

    let Some(email) = email else {
        let sessions = state.sessions.list(user_id).await;
        let _ = bot
            .send_message(chat_id, format::session_list_text(&sessions))
            .parse_mode(ParseMode::Html)
            .reply_markup(format::session_list_keyboard(&sessions))
            .await;
        return;
    };

    let Some(record) = state.sessions.get(user_id, email).await else {
        let _ = bot
            .send_message(chat_id, format::EMAIL_NOT_FOUND_TEXT)
            .await;
        return;
    };

    let placeholder = match bot.send_message(chat_id, "🔍 Checking messages...").await {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to send placeholder: {e}");
            return;
        },
    };

    // The endpoint must match the kind the mailbox was generated with.
    match state.client.check(record.kind, &record.access_token).await {
        Ok(inbox) => {
            let address = inbox.address.clone().unwrap_or_else(|| email.to_string());
            let _ = bot
                .edit_message_text(
                    chat_id,
                    placeholder.id,
                    format::inbox_text(&address, &inbox, Utc::now()),
                )
                .parse_mode(ParseMode::Html)
                .reply_markup(format::inbox_keyboard(email))
                .await;
        },
        Err(e) => {
            warn!(kind = %record.kind, "Check call failed: {e}");
            let _ = bot
                .edit_message_text(chat_id, placeholder.id, format::check_error_text(&e))
                .await;
        },
    }
}
