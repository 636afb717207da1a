//! Request token signing
//!
//! Authenticated feed API calls carry a JWT proving ownership of the account's
//! key. Producing it needs the account's private key, which lives outside this
//! crate; callers plug in a `TokenSigner`.

use crate::{ApiError, ApiResult};

#[async_trait::async_trait]
pub trait TokenSigner: Send + Sync {
    async fn sign_jwt(&self, public_key: &str) -> ApiResult<String>;
}

/// Signer handing out a pre-issued token
pub struct StaticTokenSigner {
    token: String,
}

impl StaticTokenSigner {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait::async_trait]
impl TokenSigner for StaticTokenSigner {
    async fn sign_jwt(&self, _public_key: &str) -> ApiResult<String> {
        Ok(self.token.clone())
    }
}

/// Signer for sessions without key material; every signing attempt fails
pub struct NoTokenSigner;

#[async_trait::async_trait]
impl TokenSigner for NoTokenSigner {
    async fn sign_jwt(&self, public_key: &str) -> ApiResult<String> {
        Err(ApiError::Signing(format!(
            "no signing key available for {}",
            public_key
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_signer_returns_token() {
        let signer = StaticTokenSigner::new("jwt-token");
        assert_eq!(signer.sign_jwt("BC1YLowner").await.unwrap(), "jwt-token");
    }

    #[tokio::test]
    async fn test_no_signer_fails() {
        let err = NoTokenSigner.sign_jwt("BC1YLowner").await.unwrap_err();
        assert!(matches!(err, ApiError::Signing(_)));
    }
}
