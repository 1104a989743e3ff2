//! Application Layer
//!
//! Use cases built on the domain ports.

pub mod delegation_resolver;
pub mod query_dispatcher;

pub use delegation_resolver::DelegationResolver;
pub use query_dispatcher::QueryDispatcher;
