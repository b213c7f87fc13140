//! Reply text and inline keyboards, built as pure functions of API results
//! and session data.
//!
//! All dynamic strings pass through [`html_escape`] before interpolation;
//! replies are sent with `ParseMode::Html`. Missing payload fields render
//! as placeholders instead of failing the reply.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use tempmail_client::{GeneratedMailbox, Inbox};
use tempmail_core::{MailboxKind, truncate_to_boundary};

use crate::session::SessionRecord;
use crate::trigger::Trigger;

/// Most messages shown per check reply.
const MAX_MESSAGES_SHOWN: usize = 5;

/// Bodies longer than this many characters are cut to
/// [`BODY_TRUNCATE_TO`] characters plus an ellipsis.
const MAX_BODY_CHARS: usize = 100;
const BODY_TRUNCATE_TO: usize = 97;

/// Reply when `/check` is used before any mailbox was generated.
pub const NO_SESSIONS_TEXT: &str =
    "❌ No active emails found. Generate an email first using /gen, /tenmin, or /edu";

/// Reply when a checked address is not in the user's sessions.
pub const EMAIL_NOT_FOUND_TEXT: &str = "❌ Email not found in your active sessions.";

/// Escape text for safe inclusion in Telegram HTML.
///
/// Escapes `&`, `<`, `>`, `"`, and `'` so the output is safe in both text
/// content and HTML attributes.
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Emoji marker for a mailbox kind.
#[must_use]
pub fn kind_icon(kind: MailboxKind) -> &'static str {
    match kind {
        MailboxKind::Regular => "📧",
        MailboxKind::TenMinute => "⏱",
        MailboxKind::Edu => "🎓",
    }
}

/// Welcome message for `/start`.
pub fn welcome_text(first_name: &str) -> String {
    format!(
        "🌟 <b>Welcome to TempMail Bot</b> 🌟\n\
         \n\
         Hello {}! 👋\n\
         \n\
         I can generate and manage temporary email addresses for you.\n\
         \n\
         <b>Commands:</b>\n\
         📧 /gen - Generate a regular temporary email\n\
         ⏱ /tenmin - Generate a 10-minute email\n\
         🎓 /edu - Generate an .edu email\n\
         📬 /check - Check messages for your emails\n\
         ❓ /help - Show help",
        html_escape(first_name),
    )
}

/// Quick-action keyboard attached to the welcome message.
#[must_use]
pub fn welcome_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("📧 Generate Email", &Trigger::Generate(MailboxKind::Regular))],
        vec![button("⏱ 10-Min Email", &Trigger::Generate(MailboxKind::TenMinute))],
        vec![button("🎓 Edu Email", &Trigger::Generate(MailboxKind::Edu))],
        vec![button("📬 Check Messages", &Trigger::CheckAll)],
    ])
}

/// Static help text for `/help`.
#[must_use]
pub fn help_text() -> &'static str {
    "🔹 <b>TempMail Bot Help</b> 🔹\n\
     \n\
     <b>Commands:</b>\n\
     /start - Show the welcome message\n\
     /gen - Generate a regular temporary email\n\
     /tenmin - Generate a 10-minute email (expires in 10 min)\n\
     /edu - Generate an educational (.edu) email\n\
     /check - List your emails and check messages\n\
     /help - Show this help\n\
     \n\
     <b>How to use:</b>\n\
     1. Generate an email with any command above\n\
     2. Use the address wherever you need it\n\
     3. Check messages with /check or the buttons\n\
     4. Tap an email or token to copy it"
}

/// Success reply for a freshly generated mailbox.
pub fn generated_text(mailbox: &GeneratedMailbox) -> String {
    let mut text = format!(
        "{} <b>Temporary Email Generated!</b>\n\
         \n\
         📬 <b>Email:</b> <code>{}</code>\n\
         🔑 <b>Token:</b> <code>{}</code>\n\
         ⚡ <b>Generated in:</b> {}",
        kind_icon(mailbox.kind),
        html_escape(&mailbox.address),
        html_escape(&mailbox.access_token),
        html_escape(mailbox.time_taken.as_deref().unwrap_or("N/A")),
    );

    if mailbox.kind == MailboxKind::TenMinute || mailbox.expires_at.is_some() {
        let _ = write!(
            text,
            "\n⏰ <b>Expires:</b> {}",
            html_escape(mailbox.expires_at.as_deref().unwrap_or("N/A")),
        );
    }
    if let Some(owner) = &mailbox.api_owner {
        let _ = write!(text, "\n👨‍💻 <b>API by:</b> {}", html_escape(owner));
    }

    text.push_str("\n\nTap the email or token above to copy it.");
    text
}

/// Actions attached to a generate reply.
#[must_use]
pub fn generated_keyboard(email: &str, kind: MailboxKind) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("📬 Check Messages", &Trigger::Check(email.to_string()))],
        vec![button("🔄 Generate New", &Trigger::Generate(kind))],
        vec![button("📋 Copy Email", &Trigger::Copy(email.to_string()))],
    ])
}

/// List of a user's active mailboxes, in generation order.
pub fn session_list_text(sessions: &[(String, SessionRecord)]) -> String {
    let mut text = String::from("📬 <b>Your Active Emails:</b>\n");
    for (email, record) in sessions {
        let _ = write!(
            text,
            "\n{} <code>{}</code>\n📅 Created: {}\n",
            kind_icon(record.kind),
            html_escape(email),
            record.created_at.format("%H:%M"),
        );
    }
    text
}

/// One check button per mailbox, labels truncated to stay readable.
#[must_use]
pub fn session_list_keyboard(sessions: &[(String, SessionRecord)]) -> InlineKeyboardMarkup {
    let rows = sessions
        .iter()
        .map(|(email, _)| {
            let short = truncate_to_boundary(email, 20);
            vec![button(
                &format!("📬 Check {short}..."),
                &Trigger::Check(email.clone()),
            )]
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

/// Inbox contents reply: up to [`MAX_MESSAGES_SHOWN`] messages, or a
/// "no messages" placeholder for an empty inbox.
pub fn inbox_text(address: &str, inbox: &Inbox, checked_at: DateTime<Utc>) -> String {
    if inbox.messages.is_empty() {
        return format!(
            "📭 <b>No messages found</b>\n\
             \n\
             📬 <b>Email:</b> <code>{}</code>\n\
             🔍 <b>Checked at:</b> {}\n\
             \n\
             Messages will appear here when received.",
            html_escape(address),
            checked_at.format("%H:%M:%S"),
        );
    }

    let mut text = format!("📬 <b>Messages for:</b> <code>{}</code>\n", html_escape(address));
    for (index, message) in (1..).zip(inbox.messages.iter().take(MAX_MESSAGES_SHOWN)) {
        let body = match message.body.as_deref() {
            Some(body) if !body.is_empty() => truncate_body(body),
            _ => "No content".to_string(),
        };
        let _ = write!(
            text,
            "\n📨 <b>Message {index}:</b>\n\
             👤 <b>From:</b> {}\n\
             📝 <b>Subject:</b> {}\n\
             📅 <b>Date:</b> {}\n\
             💬 <b>Content:</b> {}\n\
             \n\
             ────────────────\n",
            html_escape(non_empty_or(message.sender.as_deref(), "Unknown")),
            html_escape(non_empty_or(message.subject.as_deref(), "No Subject")),
            html_escape(non_empty_or(message.date.as_deref(), "Unknown")),
            html_escape(&body),
        );
    }
    text
}

/// Actions attached to an inbox reply.
#[must_use]
pub fn inbox_keyboard(email: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("🔄 Refresh", &Trigger::Check(email.to_string()))],
        vec![button("📧 Generate New", &Trigger::Generate(MailboxKind::Regular))],
    ])
}

/// Reply for the copy action.
pub fn copied_text(email: &str) -> String {
    format!(
        "📋 <b>Email copied!</b>\n\
         \n\
         <code>{}</code>\n\
         \n\
         Tap the email above to copy it.",
        html_escape(email),
    )
}

/// Error reply for a failed generate call.
pub fn generate_error_text(error: &tempmail_client::ApiError) -> String {
    format!("❌ Error: {}", html_escape(&error.to_string()))
}

/// Error reply for a failed check call.
pub fn check_error_text(error: &tempmail_client::ApiError) -> String {
    format!("❌ Error checking messages: {}", html_escape(&error.to_string()))
}

/// Cut a message body to at most [`MAX_BODY_CHARS`] characters; longer
/// bodies become their first [`BODY_TRUNCATE_TO`] characters plus `...`.
pub fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_BODY_CHARS {
        return body.to_string();
    }
    let mut cut: String = body.chars().take(BODY_TRUNCATE_TO).collect();
    cut.push_str("...");
    cut
}

/// Substitute a placeholder for absent or empty payload fields.
fn non_empty_or<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => placeholder,
    }
}

/// Shorthand for a callback button.
fn button(label: &str, trigger: &Trigger) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, trigger.callback_data())
}
