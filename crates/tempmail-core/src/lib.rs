//! TempMail Core - foundation types shared across the TempMail workspace.
//!
//! This crate provides:
//! - [`MailboxKind`], the mailbox taxonomy that drives endpoint selection
//!   and response parsing in every other crate
//! - Small string utilities used by the formatters

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod kind;
pub mod utils;

pub use kind::{KindParseError, MailboxKind};
pub use utils::truncate_to_boundary;
