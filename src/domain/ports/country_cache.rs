//! Country Cache Port
//!
//! Defines the interface for remembering resolved countries.

use crate::domain::entities::CacheEntry;

/// Time-bounded memory of resolved countries keyed by normalized address.
///
/// Implementations apply their TTL lazily: an expired entry may still be
/// stored but must read as absent.
pub trait CountryCache: Send + Sync {
    /// Fresh entry for `key`, if any.
    fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Remember `country` for `key`, resolved now.
    fn insert(&self, key: &str, country: String);

    /// Drop every expired entry, returning how many were removed.
    fn purge_expired(&self) -> usize;

    /// Number of stored entries, expired ones included.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
