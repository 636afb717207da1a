//! Error handling for calls to the node and feed APIs

use clout_cache::CacheError;
use thiserror::Error;

/// Result type alias for API calls
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport failure (connect, timeout, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status returned by the server
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Request token could not be produced
    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ApiError> for CacheError {
    fn from(err: ApiError) -> Self {
        CacheError::fetch(err)
    }
}
