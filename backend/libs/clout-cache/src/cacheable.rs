//! Single-resource cache with TTL freshness and request coalescing.
//!
//! State transitions:
//! - Empty/Stale → Fetching: on `get_data`
//! - Fetching → Fresh: fetch and map succeed
//! - Fetching → previous state: fetch fails (nothing is cached)
//! - any → Empty: on `reset`; an in-flight fetch keeps serving its callers but
//!   its result is discarded

use crate::{CacheMetrics, CacheResult};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

type FetchFn<R> = dyn Fn() -> BoxFuture<'static, CacheResult<R>> + Send + Sync;
type MapFn<R, T> = dyn Fn(R) -> CacheResult<T> + Send + Sync;
type PendingFetch<T> = Shared<BoxFuture<'static, CacheResult<Arc<T>>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No cached value
    Empty,
    /// Cached value within its TTL
    Fresh,
    /// Cached value past its TTL
    Stale,
    /// A fetch is in flight
    Fetching,
}

/// Memoized access to one expensive or rate-limited resource.
///
/// `R` is the raw response produced by the fetch capability, `T` the mapped
/// value handed to callers. Values are shared as `Arc<T>`; `patch` is
/// copy-on-write so snapshots already handed out never change underneath a
/// caller.
pub struct CacheableObject<R, T> {
    inner: Arc<Inner<R, T>>,
}

impl<R, T> Clone for CacheableObject<R, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<R, T> {
    resource: &'static str,
    ttl: Duration,
    fetch: Arc<FetchFn<R>>,
    map: Arc<MapFn<R, T>>,
    slot: Mutex<Slot<T>>,
    metrics: CacheMetrics,
}

struct InFlight<T> {
    id: u64,
    fetch: PendingFetch<T>,
}

struct Slot<T> {
    value: Option<Arc<T>>,
    cached_at: Option<Instant>,
    pending: Option<InFlight<T>>,
    next_fetch_id: u64,
    /// Bumped on reset so results of older fetches are not stored
    generation: u64,
}

impl<T> Slot<T> {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        matches!(self.cached_at, Some(at) if now.duration_since(at) <= ttl)
    }
}

impl<R, T> CacheableObject<R, T>
where
    R: Send + 'static,
    T: Send + Sync + 'static,
{
    /// The fetch capability is invoked on the first poll of a new fetch, with
    /// no internal lock held, so it may inspect or patch this same object.
    pub fn new<F, Fut, M>(resource: &'static str, ttl: Duration, fetch: F, map: M) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CacheResult<R>> + Send + 'static,
        M: Fn(R) -> CacheResult<T> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                resource,
                ttl,
                fetch: Arc::new(move || fetch().boxed()),
                map: Arc::new(map),
                slot: Mutex::new(Slot {
                    value: None,
                    cached_at: None,
                    pending: None,
                    next_fetch_id: 0,
                    generation: 0,
                }),
                metrics: CacheMetrics::new(),
            }),
        }
    }

    /// Shorthand for `get_data(false)`
    pub async fn get(&self) -> CacheResult<Arc<T>> {
        self.get_data(false).await
    }

    /// Return the cached value if fresh, otherwise fetch it.
    ///
    /// Calls arriving while a fetch is in flight attach to it, forced or not,
    /// and all of them settle with the same value or error.
    pub async fn get_data(&self, force_refresh: bool) -> CacheResult<Arc<T>> {
        let resource = self.inner.resource;

        let pending = {
            let mut slot = self.inner.slot.lock();

            if !force_refresh && slot.is_fresh(self.inner.ttl, Instant::now()) {
                if let Some(value) = slot.value.clone() {
                    debug!(resource = %resource, "Cache hit");
                    self.inner.metrics.record_hit(resource);
                    return Ok(value);
                }
            }

            let joined = slot.pending.as_ref().map(|in_flight| in_flight.fetch.clone());
            if let Some(pending) = joined {
                debug!(resource = %resource, force_refresh, "Joining in-flight fetch");
                self.inner.metrics.record_coalesced(resource);
                pending
            } else {
                debug!(resource = %resource, force_refresh, "Cache miss, fetching");
                self.inner.metrics.record_miss(resource);

                let id = slot.next_fetch_id;
                slot.next_fetch_id = id.wrapping_add(1);

                let pending = Self::settle(
                    Arc::downgrade(&self.inner),
                    Arc::clone(&self.inner.fetch),
                    Arc::clone(&self.inner.map),
                    resource,
                    id,
                    slot.generation,
                )
                .boxed()
                .shared();
                slot.pending = Some(InFlight {
                    id,
                    fetch: pending.clone(),
                });
                pending
            }
        };

        pending.await
    }

    /// Drive one fetch to completion and store its result if the cache was
    /// not reset in the meantime.
    async fn settle(
        owner: Weak<Inner<R, T>>,
        fetch: Arc<FetchFn<R>>,
        map: Arc<MapFn<R, T>>,
        resource: &'static str,
        fetch_id: u64,
        generation: u64,
    ) -> CacheResult<Arc<T>> {
        let result = fetch().await.and_then(|raw| map(raw)).map(Arc::new);

        let Some(inner) = owner.upgrade() else {
            return result;
        };

        let mut slot = inner.slot.lock();
        if slot.pending.as_ref().is_some_and(|in_flight| in_flight.id == fetch_id) {
            slot.pending = None;
        }
        let current = slot.generation == generation;

        match &result {
            Ok(value) if current => {
                slot.value = Some(Arc::clone(value));
                slot.cached_at = Some(Instant::now());
                debug!(resource = %resource, "Cache populated");
            }
            Ok(_) => {
                debug!(resource = %resource, "Discarding result of fetch started before reset");
            }
            Err(e) => {
                warn!(resource = %resource, error = %e, "Cache fetch failed");
                inner.metrics.record_fetch_error(resource);
            }
        }

        result
    }

    /// Clear the cached value.
    ///
    /// A fetch already in flight is not restarted: later callers keep
    /// attaching to it until it settles, and its result is not stored.
    pub fn reset(&self) {
        let mut slot = self.inner.slot.lock();
        slot.value = None;
        slot.cached_at = None;
        slot.generation = slot.generation.wrapping_add(1);

        debug!(
            resource = %self.inner.resource,
            fetch_in_flight = slot.pending.is_some(),
            "Cache reset"
        );
        self.inner.metrics.record_reset(self.inner.resource);
    }

    /// Apply an in-place update to the cached value without re-fetching.
    ///
    /// Returns `false` when nothing is cached; the update is dropped rather
    /// than triggering a fetch. The freshness timestamp is left unchanged.
    pub fn patch<F>(&self, update: F) -> bool
    where
        F: FnOnce(&mut T),
        T: Clone,
    {
        let mut slot = self.inner.slot.lock();
        match slot.value.as_mut() {
            Some(value) => {
                update(Arc::make_mut(value));
                debug!(resource = %self.inner.resource, "Cache patched");
                self.inner.metrics.record_patch(self.inner.resource);
                true
            }
            None => {
                debug!(resource = %self.inner.resource, "Patch skipped, cache empty");
                false
            }
        }
    }

    /// Cached value regardless of freshness, without fetching
    pub fn peek(&self) -> Option<Arc<T>> {
        self.inner.slot.lock().value.clone()
    }

    pub fn state(&self) -> CacheState {
        let slot = self.inner.slot.lock();
        if slot.pending.is_some() {
            CacheState::Fetching
        } else if slot.value.is_none() {
            CacheState::Empty
        } else if slot.is_fresh(self.inner.ttl, Instant::now()) {
            CacheState::Fresh
        } else {
            CacheState::Stale
        }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    pub fn resource(&self) -> &'static str {
        self.inner.resource
    }
}
