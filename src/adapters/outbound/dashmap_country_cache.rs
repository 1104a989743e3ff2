//! DashMap Country Cache
//!
//! Implements CountryCache using DashMap for concurrent access.

use crate::domain::entities::CacheEntry;
use crate::domain::ports::CountryCache;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default lifetime of a resolved country.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// DashMap-backed country cache.
///
/// Expiry is lazy: reads ignore entries older than the TTL but leave them
/// in place. [`start_sweep`](Self::start_sweep) bounds growth by purging
/// them periodically.
pub struct DashMapCountryCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl DashMapCountryCache {
    /// Create a new cache with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Start the background sweep task.
    ///
    /// Removes entries older than the TTL every `interval` until `cancel`
    /// fires.
    pub fn start_sweep(&self, interval: Duration, cancel: CancellationToken) {
        let entries = self.entries.clone();
        let ttl = self.ttl;

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }

                let removed = purge(&entries, ttl);
                if removed > 0 {
                    tracing::debug!("cache sweep removed {} expired entries", removed);
                }
            }
        });
    }
}

fn purge(entries: &DashMap<String, CacheEntry>, ttl: Duration) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| entry.is_fresh(ttl));
    before.saturating_sub(entries.len())
}

impl Default for DashMapCountryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl CountryCache for DashMapCountryCache {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries
            .get(key)
            .filter(|e| e.value().is_fresh(self.ttl))
            .map(|e| e.value().clone())
    }

    fn insert(&self, key: &str, country: String) {
        self.entries.insert(key.to_string(), CacheEntry::new(country));
    }

    fn purge_expired(&self) -> usize {
        purge(&self.entries, self.ttl)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
