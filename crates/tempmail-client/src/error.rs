//! Error types for the remote API client.

use thiserror::Error;

/// Errors produced when talking to the remote temp-mail API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed (DNS, connection refused, timeout).
    #[error("connection error: {0}")]
    Transport(String),

    /// The API answered with a non-200 status code.
    #[error("API request failed with status {0}")]
    Status(u16),

    /// The API answered 200 but the body did not match the declared shape
    /// for the requested mailbox kind.
    #[error("malformed API response: {0}")]
    Malformed(String),

    /// The configured base URL could not be parsed.
    #[error("invalid API base URL: {0}")]
    BaseUrl(String),
}

/// Convenience alias.
pub type ApiResult<T> = Result<T, ApiError>;
