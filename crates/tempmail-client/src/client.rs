//! HTTP client for the remote temp-mail API.
//!
//! One GET per operation, token passed as a `token` query parameter (the
//! transport layer percent-encodes it). No retry, no backoff, no timeout
//! override beyond the transport default.

use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use tempmail_core::MailboxKind;

use crate::error::{ApiError, ApiResult};
use crate::response::{self, GeneratedMailbox, Inbox};

/// A client for the remote temp-mail API.
#[derive(Debug, Clone)]
pub struct TempMailClient {
    http: reqwest::Client,
    /// Base URL without a trailing slash; endpoint paths are appended as-is.
    base_url: String,
}

impl TempMailClient {
    /// Create a client for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BaseUrl`] if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> ApiResult<Self> {
        Url::parse(base_url).map_err(|e| ApiError::BaseUrl(format!("{base_url}: {e}")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generate a new mailbox of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-200 status, or a
    /// payload missing the declared address/token fields.
    pub async fn generate(&self, kind: MailboxKind) -> ApiResult<GeneratedMailbox> {
        let value = self.get_json(kind.generate_path(), &[]).await?;
        response::parse_generate(kind, value)
    }

    /// Fetch the inbox for a mailbox of the given kind.
    ///
    /// The endpoint is chosen by `kind`; callers must pass the kind the
    /// mailbox was generated with, never another kind's.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-200 status, or a
    /// payload that does not decode under the kind's declared shape.
    pub async fn check(&self, kind: MailboxKind, token: &str) -> ApiResult<Inbox> {
        let value = self.get_json(kind.check_path(), &[("token", token)]).await?;
        response::parse_inbox(kind, value)
    }

    /// Issue a GET and decode the body as JSON.
    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> ApiResult<Value> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ApiError::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }
}
