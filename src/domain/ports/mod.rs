mod country_cache;
mod whois_transport;

pub use country_cache::CountryCache;
pub use whois_transport::WhoisTransport;
