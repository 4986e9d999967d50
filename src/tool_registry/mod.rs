//! Tool and mode catalog for the MCP hub.
//!
//! The registry translates an operating-mode name into the tool descriptors
//! that make up that mode. Its configuration is loaded once at start-up and
//! never mutated afterwards. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Lookup services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
