//! Adapters
//!
//! Inbound adapters feed lookups into the application layer; outbound
//! adapters implement the domain ports.

pub mod inbound;
pub mod outbound;
