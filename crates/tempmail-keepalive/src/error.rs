//! Error types for the keep-alive server.

use thiserror::Error;

/// Errors produced while starting or running the keep-alive server.
#[derive(Debug, Error)]
pub enum KeepAliveError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Socket bind or serve failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
