//! ipwhois Library
//!
//! Resolves the country owning an IP address by walking WHOIS delegations
//! from the IANA root, behind a cached, deduplicated, rate-limited
//! dispatcher.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use adapters::inbound::LineFrontend;
pub use adapters::outbound::{DashMapCountryCache, TcpWhoisTransport, TransportConfig};
pub use application::{DelegationResolver, QueryDispatcher};
pub use config::{load_config, Config};
pub use domain::entities::{LookupRequest, LookupResult};
pub use domain::error::LookupError;
pub use domain::ports::{CountryCache, WhoisTransport};
pub use infrastructure::{RateLimitConfig, RateLimiter, ShutdownController};
