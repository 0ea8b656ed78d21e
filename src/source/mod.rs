//! Remote source boundary -- the identity and incident endpoints.

pub mod dump;
pub mod http;

pub use http::HttpIncidentSource;

use crate::model::IncidentCategory;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("malformed response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SourceError::Timeout
        } else {
            SourceError::Transport(e.to_string())
        }
    }
}

/// Remote source of identities and raw incident records.
///
/// Implementations bound every call with a fixed deadline; exceeding it
/// surfaces as `SourceError::Timeout` and is handled like any other
/// transport failure. One best-effort call per fetch, no retries.
#[async_trait::async_trait]
pub trait IncidentSource: Send + Sync + 'static {
    /// Bulk identity mapping: source identifier -> employee key.
    async fn fetch_identities(&self) -> Result<HashMap<String, String>, SourceError>;

    /// Raw records for one category; shape is unknown until decode.
    async fn fetch_category(
        &self,
        category: IncidentCategory,
    ) -> Result<Vec<serde_json::Value>, SourceError>;
}
