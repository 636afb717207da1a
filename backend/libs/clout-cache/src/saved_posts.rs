//! Saved-posts tracking
//!
//! Maps post hash → saved flag for the session's account. The map is rebuilt
//! from the server on `reload_data` and patched locally after a successful
//! save/unsave call.

use crate::{CacheMetrics, CacheResult, CloutBackend};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

const RESOURCE: &str = "saved_posts";

pub struct SavedPostsCache {
    public_key: String,
    backend: Arc<dyn CloutBackend>,
    saved_posts: RwLock<SavedPosts>,
    metrics: CacheMetrics,
}

#[derive(Default)]
struct SavedPosts {
    entries: HashMap<String, bool>,
    /// Bumped by every reload and by `clear`; only the latest reload may write
    generation: u64,
}

impl SavedPostsCache {
    pub fn new(public_key: impl Into<String>, backend: Arc<dyn CloutBackend>) -> Self {
        Self {
            public_key: public_key.into(),
            backend,
            saved_posts: RwLock::new(SavedPosts::default()),
            metrics: CacheMetrics::new(),
        }
    }

    /// Replace the whole map with the server's list of saved posts.
    ///
    /// On failure the previous map is kept and the error is returned as is.
    /// A reload overtaken by `clear` or by a newer reload returns the server's
    /// list without storing it.
    pub async fn reload_data(&self) -> CacheResult<HashMap<String, bool>> {
        self.metrics.record_miss(RESOURCE);

        let generation = {
            let mut saved = self.saved_posts.write();
            saved.generation = saved.generation.wrapping_add(1);
            saved.generation
        };

        let ids = match self.backend.saved_post_ids(&self.public_key).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(public_key = %self.public_key, error = %e, "Saved posts reload failed");
                self.metrics.record_fetch_error(RESOURCE);
                return Err(e);
            }
        };

        let rebuilt: HashMap<String, bool> = ids.into_iter().map(|id| (id, true)).collect();

        let mut saved = self.saved_posts.write();
        if saved.generation != generation {
            debug!(public_key = %self.public_key, "Discarding superseded saved posts reload");
            return Ok(rebuilt);
        }

        debug!(public_key = %self.public_key, count = rebuilt.len(), "Saved posts reloaded");
        saved.entries = rebuilt.clone();
        Ok(rebuilt)
    }

    /// Record the outcome of a save/unsave call without reconciling with the server
    pub fn set_saved(&self, post_hash_hex: impl Into<String>, saved: bool) {
        self.saved_posts
            .write()
            .entries
            .insert(post_hash_hex.into(), saved);
        self.metrics.record_patch(RESOURCE);
    }

    /// Untracked posts count as not saved
    pub fn is_saved(&self, post_hash_hex: &str) -> bool {
        self.entry(post_hash_hex).unwrap_or(false)
    }

    /// Tracked entry for a post, `None` if the post is not in the map
    pub fn entry(&self, post_hash_hex: &str) -> Option<bool> {
        self.saved_posts.read().entries.get(post_hash_hex).copied()
    }

    pub fn snapshot(&self) -> HashMap<String, bool> {
        self.saved_posts.read().entries.clone()
    }

    /// Empty the map; a reload still in flight will not repopulate it
    pub fn clear(&self) {
        let mut saved = self.saved_posts.write();
        saved.entries.clear();
        saved.generation = saved.generation.wrapping_add(1);
        self.metrics.record_reset(RESOURCE);
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockCloutBackend;
    use crate::CacheError;

    fn backend_returning(ids: Vec<&'static str>) -> Arc<dyn CloutBackend> {
        let mut backend = MockCloutBackend::new();
        backend
            .expect_saved_post_ids()
            .withf(|pk| pk == "BC1YLowner")
            .returning(move |_| Ok(ids.iter().map(|s| s.to_string()).collect()));
        Arc::new(backend)
    }

    #[tokio::test]
    async fn test_reload_replaces_map() {
        let cache = SavedPostsCache::new("BC1YLowner", backend_returning(vec!["B", "C"]));
        cache.set_saved("A", true);
        cache.set_saved("B", true);

        let reloaded = cache.reload_data().await.unwrap();

        assert_eq!(reloaded.len(), 2);
        assert_eq!(cache.entry("A"), None);
        assert_eq!(cache.entry("B"), Some(true));
        assert_eq!(cache.entry("C"), Some(true));
        assert_eq!(cache.snapshot(), reloaded);
    }

    #[tokio::test]
    async fn test_reload_failure_keeps_previous_map() {
        let mut backend = MockCloutBackend::new();
        backend
            .expect_saved_post_ids()
            .times(1)
            .returning(|_| Err(CacheError::fetch("jwt rejected")));

        let cache = SavedPostsCache::new("BC1YLowner", Arc::new(backend));
        cache.set_saved("A", true);

        let err = cache.reload_data().await.unwrap_err();
        assert_eq!(err.to_string(), "Fetch failed: jwt rejected");
        assert!(cache.is_saved("A"));
    }

    #[test]
    fn test_local_updates() {
        let cache = SavedPostsCache::new("BC1YLowner", Arc::new(MockCloutBackend::new()));
        assert!(!cache.is_saved("A"));

        cache.set_saved("A", true);
        assert!(cache.is_saved("A"));

        cache.set_saved("A", false);
        assert!(!cache.is_saved("A"));
        assert_eq!(cache.entry("A"), Some(false));

        cache.clear();
        assert!(cache.snapshot().is_empty());
    }
}
