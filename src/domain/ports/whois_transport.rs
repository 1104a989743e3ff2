//! WHOIS Transport Port
//!
//! Defines the interface for sending one query to one WHOIS server.

use crate::domain::error::LookupError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Transport for a single WHOIS exchange.
///
/// This is an outbound port: the resolver hands it a host and an address
/// and gets back the raw response text. Implementations own connection
/// handling and per-registry query formatting.
#[async_trait]
pub trait WhoisTransport: Send + Sync {
    /// Query `host` (scheme and port optional) for `ip` and return the full
    /// response.
    ///
    /// Must fail with [`LookupError::Cancelled`] once `cancel` fires.
    async fn query(
        &self,
        cancel: &CancellationToken,
        host: &str,
        ip: &str,
    ) -> Result<String, LookupError>;
}
