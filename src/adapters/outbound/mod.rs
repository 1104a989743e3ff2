mod dashmap_country_cache;
#[cfg(test)]
mod mock_whois_transport;
mod tcp_whois_transport;

pub use dashmap_country_cache::{DashMapCountryCache, DEFAULT_CACHE_TTL};
#[cfg(test)]
pub(crate) use mock_whois_transport::MockTransport;
pub use tcp_whois_transport::{TcpWhoisTransport, TransportConfig};
