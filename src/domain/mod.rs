//! Domain Layer
//!
//! Entities, value objects, pure services and the ports the outer layers
//! implement.

pub mod entities;
pub mod error;
pub mod ports;
pub mod services;
pub mod value_objects;
