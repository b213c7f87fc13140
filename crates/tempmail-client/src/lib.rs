//! TempMail API client - a thin HTTP client for the remote temp-mail service.
//!
//! The remote API is a set of unauthenticated GET endpoints, one
//! generate/check pair per [`MailboxKind`](tempmail_core::MailboxKind).
//! Success payloads are not shaped consistently across kinds, so each kind
//! has its own declared parser; see [`response`].
//!
//! The client never retries and never suppresses a failure; every error is
//! normalized into [`ApiError`] and surfaced to the caller verbatim.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod client;
pub mod error;
pub mod response;

pub use client::TempMailClient;
pub use error::{ApiError, ApiResult};
pub use response::{GeneratedMailbox, Inbox, InboxMessage};
