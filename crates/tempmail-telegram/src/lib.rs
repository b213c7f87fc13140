//! TempMail Telegram Bot — a thin Telegram frontend over the remote
//! temp-mail HTTP API.
//!
//! Users generate disposable mailboxes (`/gen`, `/tenmin`, `/edu`), list
//! them, and poll for received messages (`/check`). Generated mailboxes
//! live in an in-memory, per-user session store for the lifetime of the
//! process; nothing is persisted.
//!
//! This crate can be used as a library or as the `tempmail-telegram`
//! standalone binary (typically launched by `tempmail-supervisor`).

pub mod bot;
pub mod config;
pub mod error;
pub mod format;
pub mod handler;
pub mod session;
pub mod trigger;
