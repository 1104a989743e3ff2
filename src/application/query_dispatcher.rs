//! Query Dispatcher - Main application use case
//!
//! Turns an unbounded stream of lookup requests into cached, deduplicated,
//! rate-limited WHOIS resolutions. This is the primary interface for the
//! inbound adapter.

use crate::application::DelegationResolver;
use crate::domain::entities::{LookupRequest, LookupResult};
use crate::domain::error::LookupError;
use crate::domain::ports::CountryCache;
use crate::infrastructure::{InflightGroup, RateLimiter, ShutdownController};
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Outcome shared by every member of a deduplication group: the country
/// and whether the leader found it in the cache after all.
type Shared = Result<(String, bool), LookupError>;

/// Query dispatcher - main application use case.
///
/// For every request:
/// 1. Answers from the cache when a fresh entry exists
/// 2. Otherwise joins the in-flight resolution for the same address, or
///    leads a new one
/// 3. A leader takes a rate-limiter token, walks the delegation chain from
///    the root host and caches a successful answer
///
/// Failures are never cached. Tokens are only spent by leaders.
pub struct QueryDispatcher {
    resolver: Arc<DelegationResolver>,
    cache: Arc<dyn CountryCache>,
    limiter: Arc<RateLimiter>,
    inflight: InflightGroup<Shared>,
    root_host: String,
    shutdown: ShutdownController,
}

impl QueryDispatcher {
    /// Create a new dispatcher.
    pub fn new(
        resolver: Arc<DelegationResolver>,
        cache: Arc<dyn CountryCache>,
        limiter: Arc<RateLimiter>,
        root_host: impl Into<String>,
        shutdown: ShutdownController,
    ) -> Self {
        Self {
            resolver,
            cache,
            limiter,
            inflight: InflightGroup::new(),
            root_host: root_host.into(),
            shutdown,
        }
    }

    /// Serve requests until the stream ends or shutdown starts.
    ///
    /// Each request runs on its own task; this loop never waits for a
    /// resolution. Requests still queued at shutdown are dropped, which
    /// closes their callers' receivers.
    pub async fn serve(self: Arc<Self>, mut requests: mpsc::UnboundedReceiver<LookupRequest>) {
        let cancel = self.shutdown.token();

        loop {
            let request = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                request = requests.recv() => match request {
                    Some(request) => request,
                    None => break,
                },
            };

            let dispatcher = self.clone();
            let guard = self.shutdown.lookup_guard();
            tokio::spawn(async move {
                let _guard = guard;
                let result = dispatcher.lookup(&request.raw_address).await;
                let address = request.normalized().to_string();
                if !request.respond(result) {
                    tracing::debug!("caller stopped waiting for {}", address);
                }
            });
        }

        tracing::info!("dispatcher stopped accepting lookups");
    }

    /// Resolve one address.
    pub async fn lookup(&self, raw_address: &str) -> LookupResult {
        let key = raw_address.trim();

        if let Some(entry) = self.cache.get(key) {
            tracing::debug!("cache hit for {} -> {}", key, entry.country);
            return LookupResult::found(entry.country, true);
        }

        if key.parse::<IpAddr>().is_err() {
            return LookupResult::failed(LookupError::InvalidInput(key.to_string()), false);
        }

        match self.inflight.run(key, || self.resolve_fresh(key)).await {
            Some((Ok((country, cached)), shared)) => LookupResult::found(country, cached || shared),
            Some((Err(e), shared)) => {
                tracing::warn!("lookup for {} failed: {}", key, e);
                LookupResult::failed(e, shared)
            }
            None => LookupResult::failed(LookupError::Abandoned, true),
        }
    }

    /// Leader path: resolve `key` over the network and cache the answer.
    async fn resolve_fresh(&self, key: &str) -> Shared {
        // A previous leader may have filled the cache between our miss and
        // its release of the key.
        if let Some(entry) = self.cache.get(key) {
            return Ok((entry.country, true));
        }

        let cancel = self.shutdown.token();
        self.limiter.acquire(&cancel).await?;

        let country = self.resolver.resolve(&cancel, &self.root_host, key).await?;
        self.cache.insert(key, country.clone());
        Ok((country, false))
    }

    /// Addresses currently being resolved.
    pub fn in_flight(&self) -> usize {
        self.inflight.in_flight()
    }
}
