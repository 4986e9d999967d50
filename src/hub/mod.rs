//! Connection-lifecycle orchestration for the tools of one mode.
//!
//! A [`Hub`](services::Hub) owns one [`ToolInstance`](domain::ToolInstance)
//! per tool kind of its mode and drives each instance through the
//! connection state machine behind an injected
//! [`Connector`](ports::Connector). The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
