//! Per-account cache sessions
//!
//! A `CacheSession` binds every cached resource to one logged-in account.
//! `SessionManager` owns the current session and replaces it on login, so a
//! new account never observes state cached for the previous one.

use crate::models::{ExchangeRate, ExchangeRateResponse, PinnedPostResponse};
use crate::user::{user_cache, UserCache};
use crate::{CacheError, CacheResult, CacheableObject, CloutBackend, SavedPostsCache, TtlConfig};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

pub type ExchangeRateCache = CacheableObject<ExchangeRateResponse, ExchangeRate>;
pub type PinnedPostCache = CacheableObject<PinnedPostResponse, Option<String>>;

pub struct CacheSession {
    public_key: String,
    pub user: UserCache,
    pub saved_posts: SavedPostsCache,
    pub pinned_post: PinnedPostCache,
    pub exchange_rate: ExchangeRateCache,
}

impl CacheSession {
    pub fn new(public_key: &str, backend: Arc<dyn CloutBackend>, ttl: &TtlConfig) -> Self {
        let exchange_rate = {
            let backend = Arc::clone(&backend);
            CacheableObject::new(
                "exchange_rate",
                ttl.exchange_rate,
                move || {
                    let backend = Arc::clone(&backend);
                    async move { backend.exchange_rate().await }
                },
                |raw: ExchangeRateResponse| Ok(ExchangeRate::from(raw)),
            )
        };

        let pinned_post = {
            let backend = Arc::clone(&backend);
            CacheableObject::new(
                "pinned_post",
                ttl.pinned_post,
                move || {
                    let backend = Arc::clone(&backend);
                    async move { backend.pinned_post().await }
                },
                |raw: PinnedPostResponse| Ok(raw.post_hash_hex.filter(|hash| !hash.is_empty())),
            )
        };

        Self {
            public_key: public_key.to_string(),
            user: user_cache(Arc::clone(&backend), public_key, ttl.user),
            saved_posts: SavedPostsCache::new(public_key, backend),
            pinned_post,
            exchange_rate,
        }
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Add `public_key` to the cached user's followed keys.
    ///
    /// Returns `false` without fetching when the user is not cached yet.
    pub fn add_follower(&self, public_key: &str) -> bool {
        let patched = self.user.patch(|user| {
            user.add_followed_key(public_key);
        });
        debug!(public_key = %public_key, patched, "Follow applied to cached user");
        patched
    }

    /// Remove `public_key` from the cached user's followed keys.
    ///
    /// Returns `false` without fetching when the user is not cached yet.
    pub fn remove_follower(&self, public_key: &str) -> bool {
        let patched = self.user.patch(|user| {
            user.remove_followed_key(public_key);
        });
        debug!(public_key = %public_key, patched, "Unfollow applied to cached user");
        patched
    }

    /// Follow state according to the cached user, `None` if not cached
    pub fn is_following(&self, public_key: &str) -> Option<bool> {
        self.user.peek().map(|user| user.follows(public_key))
    }

    pub fn reset_all(&self) {
        self.user.reset();
        self.pinned_post.reset();
        self.exchange_rate.reset();
        self.saved_posts.clear();
    }
}

/// Owner of the current `CacheSession`.
///
/// Consumers receive the manager (or the session it hands out) explicitly
/// instead of reaching for a global.
pub struct SessionManager {
    backend: Arc<dyn CloutBackend>,
    ttl: TtlConfig,
    current: RwLock<Option<Arc<CacheSession>>>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn CloutBackend>, ttl: TtlConfig) -> Self {
        Self {
            backend,
            ttl,
            current: RwLock::new(None),
        }
    }

    /// Start a session for `public_key`, tearing down any previous one.
    pub fn create_session(&self, public_key: &str) -> Arc<CacheSession> {
        let session = Arc::new(CacheSession::new(
            public_key,
            Arc::clone(&self.backend),
            &self.ttl,
        ));

        let previous = self.current.write().replace(Arc::clone(&session));
        if let Some(previous) = previous {
            previous.reset_all();
            info!(
                previous = %previous.public_key(),
                public_key = %public_key,
                "Cache session replaced"
            );
        } else {
            info!(public_key = %public_key, "Cache session created");
        }

        session
    }

    /// End the current session. Returns `false` if there was none.
    pub fn destroy_session(&self) -> bool {
        match self.current.write().take() {
            Some(session) => {
                session.reset_all();
                info!(public_key = %session.public_key(), "Cache session destroyed");
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> Option<Arc<CacheSession>> {
        self.current.read().clone()
    }

    /// Current session, or `CacheError::NoSession` when logged out
    pub fn require(&self) -> CacheResult<Arc<CacheSession>> {
        self.current().ok_or(CacheError::NoSession)
    }

    pub fn ttl(&self) -> &TtlConfig {
        &self.ttl
    }
}
