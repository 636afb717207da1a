//! Port through which the cache reaches the remote API.

use crate::models::{ExchangeRateResponse, GetUsersResponse, PinnedPostResponse};
use crate::CacheResult;

/// Remote data source behind a cache session.
///
/// Implementations own transport, auth and endpoint details; the cache only
/// sees raw responses or an opaque `CacheError`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CloutBackend: Send + Sync {
    /// Look up a single user by public key
    async fn user(&self, public_key: &str) -> CacheResult<GetUsersResponse>;

    async fn exchange_rate(&self) -> CacheResult<ExchangeRateResponse>;

    async fn pinned_post(&self) -> CacheResult<PinnedPostResponse>;

    /// Ids of the posts saved by `public_key`. Signs its own request token.
    async fn saved_post_ids(&self, public_key: &str) -> CacheResult<Vec<String>>;
}
