//! Declared response parsers, one per mailbox kind.
//!
//! The remote API spells its success fields differently per kind: regular
//! and ten-minute mailboxes arrive as `temp_mail`, edu mailboxes as
//! `edu_mail`; message fields are lowercase (`from`, `subject`,
//! `receivedAt`, `body`) for the former and capitalized (`From`, `Subject`,
//! `Date`, `Message`) for the latter. Rather than probing field names at
//! runtime, each kind gets its own serde struct and the result is
//! normalized into the kind-independent types below. A generate payload
//! missing its address or token is rejected loudly; optional display
//! fields stay `None` and are replaced with placeholders at render time.

use serde::Deserialize;
use serde_json::Value;

use tempmail_core::MailboxKind;

use crate::error::{ApiError, ApiResult};

/// A freshly generated mailbox, normalized across kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMailbox {
    /// Which flavor of mailbox was generated.
    pub kind: MailboxKind,
    /// The mailbox address.
    pub address: String,
    /// Opaque token required for subsequent check calls.
    pub access_token: String,
    /// Expiry hint, present for ten-minute mailboxes.
    pub expires_at: Option<String>,
    /// Generation latency as reported by the API.
    pub time_taken: Option<String>,
    /// Attribution string the API includes in its payloads.
    pub api_owner: Option<String>,
}

/// Inbox contents for one mailbox, normalized across kinds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Inbox {
    /// The mailbox address as echoed by the API, when present.
    pub address: Option<String>,
    /// Messages, oldest first, exactly as returned.
    pub messages: Vec<InboxMessage>,
}

/// One received email. Every field is optional; the API frequently omits
/// them and display code substitutes placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InboxMessage {
    /// Sender address or name.
    pub sender: Option<String>,
    /// Subject line.
    pub subject: Option<String>,
    /// Receipt date, in whatever format the API chose.
    pub date: Option<String>,
    /// Message body.
    pub body: Option<String>,
}

// ── Per-kind wire shapes ─────────────────────────────────────

#[derive(Deserialize)]
struct StandardGenerateReply {
    temp_mail: String,
    access_token: String,
    expires_at: Option<String>,
    time_taken: Option<String>,
    api_owner: Option<String>,
}

#[derive(Deserialize)]
struct EduGenerateReply {
    edu_mail: String,
    access_token: String,
    time_taken: Option<String>,
    api_owner: Option<String>,
}

#[derive(Deserialize)]
struct StandardInboxReply {
    mailbox: Option<String>,
    #[serde(default)]
    messages: Vec<StandardMessage>,
}

#[derive(Deserialize)]
struct StandardMessage {
    from: Option<String>,
    subject: Option<String>,
    #[serde(rename = "receivedAt")]
    received_at: Option<String>,
    body: Option<String>,
}

#[derive(Deserialize)]
struct EduInboxReply {
    edu_mail: Option<String>,
    #[serde(default)]
    messages: Vec<EduMessage>,
}

#[derive(Deserialize)]
struct EduMessage {
    #[serde(rename = "From")]
    from: Option<String>,
    #[serde(rename = "Subject")]
    subject: Option<String>,
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "Message")]
    message: Option<String>,
}

// ── Parsers ──────────────────────────────────────────────────

/// Parse a generate-endpoint payload for the given kind.
///
/// # Errors
///
/// Returns [`ApiError::Malformed`] when the payload does not carry the
/// address and token fields declared for that kind.
pub fn parse_generate(kind: MailboxKind, value: Value) -> ApiResult<GeneratedMailbox> {
    match kind {
        MailboxKind::Regular | MailboxKind::TenMinute => {
            let reply: StandardGenerateReply =
                serde_json::from_value(value).map_err(|e| ApiError::Malformed(e.to_string()))?;
            Ok(GeneratedMailbox {
                kind,
                address: reply.temp_mail,
                access_token: reply.access_token,
                expires_at: reply.expires_at,
                time_taken: reply.time_taken,
                api_owner: reply.api_owner,
            })
        },
        MailboxKind::Edu => {
            let reply: EduGenerateReply =
                serde_json::from_value(value).map_err(|e| ApiError::Malformed(e.to_string()))?;
            Ok(GeneratedMailbox {
                kind,
                address: reply.edu_mail,
                access_token: reply.access_token,
                expires_at: None,
                time_taken: reply.time_taken,
                api_owner: reply.api_owner,
            })
        },
    }
}

/// Parse a check-endpoint payload for the given kind.
///
/// # Errors
///
/// Returns [`ApiError::Malformed`] when the payload does not decode under
/// the declared shape for that kind.
pub fn parse_inbox(kind: MailboxKind, value: Value) -> ApiResult<Inbox> {
    match kind {
        MailboxKind::Regular | MailboxKind::TenMinute => {
            let reply: StandardInboxReply =
                serde_json::from_value(value).map_err(|e| ApiError::Malformed(e.to_string()))?;
            Ok(Inbox {
                address: reply.mailbox,
                messages: reply
                    .messages
                    .into_iter()
                    .map(|m| InboxMessage {
                        sender: m.from,
                        subject: m.subject,
                        date: m.received_at,
                        body: m.body,
                    })
                    .collect(),
            })
        },
        MailboxKind::Edu => {
            let reply: EduInboxReply =
                serde_json::from_value(value).map_err(|e| ApiError::Malformed(e.to_string()))?;
            Ok(Inbox {
                address: reply.edu_mail,
                messages: reply
                    .messages
                    .into_iter()
                    .map(|m| InboxMessage {
                        sender: m.from,
                        subject: m.subject,
                        date: m.date,
                        body: m.message,
                    })
                    .collect(),
            })
        },
    }
}
