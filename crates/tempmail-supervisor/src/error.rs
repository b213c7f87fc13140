//! Error types for the supervisor.

use thiserror::Error;

/// Errors produced by the supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A service failed to spawn.
    #[error("failed to spawn {service}: {source}")]
    Spawn {
        /// Service name.
        service: String,
        /// Underlying spawn failure.
        source: std::io::Error,
    },
}

/// Convenience alias.
pub type SupervisorResult<T> = Result<T, SupervisorError>;
