//! Rate Limiter
//!
//! Process-wide token bucket guarding outbound WHOIS resolutions.

use crate::domain::error::LookupError;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum burst size (token bucket capacity)
    pub burst_size: u64,
    /// Time to refill a single token
    pub refill_interval: Duration,
}

impl Default for RateLimitConfig {
    /// 30 tokens, one more per minute.
    fn default() -> Self {
        Self {
            burst_size: 30,
            refill_interval: Duration::from_secs(60),
        }
    }
}

struct Bucket {
    tokens: u64,
    last_refill: Instant,
}

/// Token bucket rate limiter.
///
/// A single bucket shared by every caller. Refill is computed lazily on
/// each access, in whole tokens, carrying the fractional remainder forward
/// so slow callers do not lose credit.
pub struct RateLimiter {
    config: RateLimitConfig,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// Create a new rate limiter with a full bucket.
    pub fn new(config: RateLimitConfig) -> Self {
        let bucket = Bucket {
            tokens: config.burst_size,
            last_refill: Instant::now(),
        };
        Self {
            config,
            bucket: Mutex::new(bucket),
        }
    }

    /// Take a token if one is available.
    ///
    /// Returns true if allowed, false if rate limited.
    pub fn check(&self) -> bool {
        self.try_take().is_ok()
    }

    /// Take a token, or report how long until the next one arrives.
    fn try_take(&self) -> Result<(), Duration> {
        let mut bucket = self.bucket.lock();
        let now = Instant::now();
        self.refill(&mut bucket, now);

        if bucket.tokens > 0 {
            bucket.tokens -= 1;
            return Ok(());
        }

        let next = bucket.last_refill + self.config.refill_interval;
        Err(next.saturating_duration_since(now))
    }

    fn refill(&self, bucket: &mut Bucket, now: Instant) {
        if bucket.tokens >= self.config.burst_size {
            bucket.last_refill = now;
            return;
        }

        let interval = self.config.refill_interval.as_nanos().max(1);
        let elapsed = now.saturating_duration_since(bucket.last_refill).as_nanos();
        let earned = (elapsed / interval) as u64;
        if earned == 0 {
            return;
        }

        bucket.tokens = (bucket.tokens + earned).min(self.config.burst_size);
        if bucket.tokens == self.config.burst_size {
            bucket.last_refill = now;
        } else {
            bucket.last_refill += self.config.refill_interval * earned as u32;
        }
    }

    /// Wait for a token.
    ///
    /// Fails with [`LookupError::Cancelled`] if `cancel` fires first.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), LookupError> {
        loop {
            if cancel.is_cancelled() {
                return Err(LookupError::Cancelled);
            }

            let wait = match self.try_take() {
                Ok(()) => return Ok(()),
                Err(wait) => wait,
            };

            tracing::debug!("rate limited, next token in {:?}", wait);
            tokio::select! {
                _ = cancel.cancelled() => return Err(LookupError::Cancelled),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// Tokens currently available.
    pub fn remaining(&self) -> u64 {
        let mut bucket = self.bucket.lock();
        self.refill(&mut bucket, Instant::now());
        bucket.tokens
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
