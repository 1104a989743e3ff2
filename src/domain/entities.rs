//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the lookup domain.
//! They depend on nothing but tokio's channel and clock types.

use crate::domain::error::LookupError;
use tokio::sync::oneshot;
use tokio::time::{Duration, Instant};

/// A request to resolve the country owning an address.
///
/// The caller keeps the receiving half returned by [`LookupRequest::new`]
/// and is responsible for its own timeout. The dispatcher answers at most
/// once; an answer sent after the caller gave up is discarded.
#[derive(Debug)]
pub struct LookupRequest {
    /// Address exactly as the caller supplied it
    pub raw_address: String,
    response: oneshot::Sender<LookupResult>,
}

impl LookupRequest {
    /// Create a request and the receiver its answer will arrive on.
    pub fn new(raw_address: impl Into<String>) -> (Self, oneshot::Receiver<LookupResult>) {
        let (response, rx) = oneshot::channel();
        (
            Self {
                raw_address: raw_address.into(),
                response,
            },
            rx,
        )
    }

    /// Address with surrounding whitespace removed; the cache and
    /// deduplication key.
    pub fn normalized(&self) -> &str {
        self.raw_address.trim()
    }

    /// Deliver the answer, consuming the request.
    ///
    /// Returns false when the caller already dropped its receiver.
    pub fn respond(self, result: LookupResult) -> bool {
        self.response.send(result).is_ok()
    }
}

/// Outcome of a single lookup.
#[derive(Debug, Clone)]
pub struct LookupResult {
    /// ISO country code, empty on error
    pub country: String,
    pub error: Option<LookupError>,
    /// True when answered from the cache or from another caller's
    /// in-flight resolution
    pub served_from_cache: bool,
}

impl LookupResult {
    pub fn found(country: impl Into<String>, served_from_cache: bool) -> Self {
        Self {
            country: country.into(),
            error: None,
            served_from_cache,
        }
    }

    pub fn failed(error: LookupError, served_from_cache: bool) -> Self {
        Self {
            country: String::new(),
            error: Some(error),
            served_from_cache,
        }
    }

}

/// A resolved country remembered for a normalized address.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub country: String,
    pub resolved_at: Instant,
}

impl CacheEntry {
    pub fn new(country: String) -> Self {
        Self {
            country,
            resolved_at: Instant::now(),
        }
    }

    /// An entry exactly `ttl` old is still fresh.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.resolved_at.elapsed() <= ttl
    }
}
