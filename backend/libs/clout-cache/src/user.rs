//! User caching module
//!
//! Caches the logged-in account's user entry and keeps its followed-keys list
//! in step with local follow/unfollow actions.

use crate::models::{GetUsersResponse, UserEntry};
use crate::{CacheError, CacheResult, CacheableObject, CloutBackend};
use std::sync::Arc;
use std::time::Duration;

pub type UserCache = CacheableObject<GetUsersResponse, UserEntry>;

/// Build the cache for one account's user entry
pub fn user_cache(backend: Arc<dyn CloutBackend>, public_key: &str, ttl: Duration) -> UserCache {
    let public_key = public_key.to_string();
    CacheableObject::new(
        "user",
        ttl,
        move || {
            let backend = Arc::clone(&backend);
            let public_key = public_key.clone();
            async move { backend.user(&public_key).await }
        },
        first_user,
    )
}

/// Map a `get-users-stateless` response to its first entry
pub fn first_user(response: GetUsersResponse) -> CacheResult<UserEntry> {
    response
        .user_list
        .into_iter()
        .next()
        .ok_or_else(|| CacheError::InvalidResponse("empty UserList".to_string()))
}

impl UserEntry {
    pub fn follows(&self, public_key: &str) -> bool {
        self.public_keys_base58_check_followed_by_user
            .iter()
            .any(|pk| pk == public_key)
    }

    /// Returns `false` if the key was already followed
    pub fn add_followed_key(&mut self, public_key: &str) -> bool {
        if self.follows(public_key) {
            return false;
        }
        self.public_keys_base58_check_followed_by_user
            .push(public_key.to_string());
        true
    }

    /// Returns `false` if the key was not followed
    pub fn remove_followed_key(&mut self, public_key: &str) -> bool {
        match self
            .public_keys_base58_check_followed_by_user
            .iter()
            .position(|pk| pk == public_key)
        {
            Some(index) => {
                self.public_keys_base58_check_followed_by_user.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.profile_entry_response
            .as_ref()
            .map(|profile| profile.username.as_str())
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_following(keys: &[&str]) -> UserEntry {
        UserEntry {
            public_key_base58_check: "BC1YLowner".to_string(),
            public_keys_base58_check_followed_by_user: keys
                .iter()
                .map(|k| k.to_string())
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_followed_key_is_idempotent() {
        let mut user = user_following(&["a"]);
        assert!(user.add_followed_key("b"));
        assert!(!user.add_followed_key("b"));
        assert_eq!(user.public_keys_base58_check_followed_by_user, vec!["a", "b"]);
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let mut user = user_following(&["a", "b"]);
        assert!(!user.remove_followed_key("c"));
        assert!(user.remove_followed_key("a"));
        assert_eq!(user.public_keys_base58_check_followed_by_user, vec!["b"]);
    }

    #[test]
    fn test_first_user_rejects_empty_list() {
        let err = first_user(GetUsersResponse::default()).unwrap_err();
        assert!(matches!(err, CacheError::InvalidResponse(_)));
    }

    #[test]
    fn test_username_ignores_empty_profile_name() {
        let mut user = user_following(&[]);
        assert_eq!(user.username(), None);

        user.profile_entry_response = Some(Default::default());
        assert_eq!(user.username(), None);

        user.profile_entry_response.as_mut().unwrap().username = "alice".to_string();
        assert_eq!(user.username(), Some("alice"));
    }
}
