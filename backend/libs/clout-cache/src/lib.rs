//! CloutFeed client caching layer
//!
//! Memoized access to the handful of remote resources every screen needs:
//! - TTL-based freshness with explicit forced refresh
//! - Single-flight fetching (concurrent readers share one request)
//! - Audited in-place patches for optimistic local updates
//! - Per-account sessions with an explicit create/destroy lifecycle
//! - Metrics integration

mod backend;
mod cacheable;
mod error;
mod metrics;
mod saved_posts;

pub mod models;
pub mod session;
pub mod user;

pub use backend::CloutBackend;
pub use cacheable::{CacheState, CacheableObject};
pub use error::{BoxError, CacheError, CacheResult};
pub use metrics::CacheMetrics;
pub use saved_posts::SavedPostsCache;
pub use session::{CacheSession, SessionManager};

use std::time::Duration;

/// Default TTL values (seconds)
pub mod ttl {
    pub const USER: u64 = 600; // 10 minutes
    pub const EXCHANGE_RATE: u64 = 600; // 10 minutes
    pub const PINNED_POST: u64 = 1800; // 30 minutes
}

/// Freshness windows for the resources of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlConfig {
    pub user: Duration,
    pub exchange_rate: Duration,
    pub pinned_post: Duration,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            user: Duration::from_secs(ttl::USER),
            exchange_rate: Duration::from_secs(ttl::EXCHANGE_RATE),
            pinned_post: Duration::from_secs(ttl::PINNED_POST),
        }
    }
}
