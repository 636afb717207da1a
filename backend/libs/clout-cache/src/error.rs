//! Cache error types

use std::sync::Arc;
use thiserror::Error;

/// Boxed error produced by a fetch capability.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the cache layer.
///
/// `Clone` so that every caller attached to a coalesced fetch receives the
/// same failure.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    #[error("Fetch failed: {0}")]
    Fetch(Arc<dyn std::error::Error + Send + Sync + 'static>),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No active cache session")]
    NoSession,
}

impl CacheError {
    /// Wrap any error raised by a fetch capability.
    pub fn fetch<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        CacheError::Fetch(Arc::from(err.into()))
    }

    pub fn is_fetch(&self) -> bool {
        matches!(self, CacheError::Fetch(_))
    }
}

pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CacheError::fetch("network error");
        assert_eq!(err.to_string(), "Fetch failed: network error");

        let err = CacheError::InvalidResponse("empty UserList".to_string());
        assert_eq!(err.to_string(), "Invalid response: empty UserList");
    }

    #[test]
    fn test_clone_shares_source() {
        let err = CacheError::fetch("timeout");
        let cloned = err.clone();

        match (&err, &cloned) {
            (CacheError::Fetch(a), CacheError::Fetch(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("expected fetch errors"),
        }
    }
}
