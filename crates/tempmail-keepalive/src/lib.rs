//! TempMail keep-alive server.
//!
//! A tiny read-only HTTP service that hosting platforms can poll to keep
//! the deployment warm and to observe process uptime. Serves four JSON GET
//! endpoints and JSON bodies for not-found and internal-error conditions;
//! nothing here mutates state.
//!
//! Runs standalone as the `tempmail-keepalive` binary so the supervisor
//! can manage it as a sibling of the API and bot processes.

pub mod config;
pub mod error;
pub mod server;

pub use config::KeepAliveConfig;
pub use error::KeepAliveError;
pub use server::{build_router, serve, ServerState};
