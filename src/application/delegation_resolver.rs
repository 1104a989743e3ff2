//! Delegation Resolver
//!
//! Walks the WHOIS delegation tree from a root registry down to the one
//! that knows the country of an address.

use crate::domain::error::LookupError;
use crate::domain::ports::WhoisTransport;
use crate::domain::services::{Directive, ResponseParser};
use crate::domain::value_objects::WhoisHost;
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Default cap on queries made for a single address.
pub const DEFAULT_MAX_HOPS: usize = 8;

/// Follows referral and redirect pointers until a country line appears.
///
/// Each response is read with [`ResponseParser`]: a `referralserver:` line
/// wins over a `whois:` line, which wins over a `country:` line. The chain
/// is an explicit loop bounded by `max_hops`. A pointer back to a host
/// already queried for this address is not followed; the current response
/// is then searched for a country line instead.
pub struct DelegationResolver {
    transport: Arc<dyn WhoisTransport>,
    max_hops: usize,
}

impl DelegationResolver {
    pub fn new(transport: Arc<dyn WhoisTransport>, max_hops: usize) -> Self {
        Self {
            transport,
            max_hops: max_hops.max(1),
        }
    }

    /// Resolve the country owning `raw_ip`, starting at `root_host`.
    ///
    /// `raw_ip` must parse as an IP address; it is sent in canonical form.
    /// Nothing touches the network for an unparsable address.
    pub async fn resolve(
        &self,
        cancel: &CancellationToken,
        root_host: &str,
        raw_ip: &str,
    ) -> Result<String, LookupError> {
        let ip: IpAddr = raw_ip
            .parse()
            .map_err(|_| LookupError::InvalidInput(raw_ip.to_string()))?;
        let ip = ip.to_string();

        let mut host = root_host.to_string();
        let mut visited = HashSet::new();

        for hop in 0..self.max_hops {
            let body = self.transport.query(cancel, &host, &ip).await?;
            visited.insert(visit_key(&host));

            let next = match ResponseParser::parse(&body) {
                Directive::Referral(next) | Directive::Redirect(next) => next,
                Directive::Country(country) => {
                    tracing::debug!("{} resolved to {} by {}", ip, country, host);
                    return Ok(country);
                }
                Directive::NotFound => return Err(LookupError::AnswerNotFound),
            };

            let next = next.to_string();
            if visited.contains(&next) {
                tracing::debug!("{} points back to {}, not following", host, next);
                return ResponseParser::country(&body).ok_or(LookupError::AnswerNotFound);
            }

            tracing::debug!(hop, "{} delegates {} to {}", host, ip, next);
            host = next;
        }

        tracing::warn!("{} still delegated after {} hops", ip, self.max_hops);
        Err(LookupError::DelegationLimit(self.max_hops))
    }
}

fn visit_key(host: &str) -> String {
    WhoisHost::parse(host)
        .map(|h| h.to_string())
        .unwrap_or_else(|| host.to_ascii_lowercase())
}
