//! MCP Hub: tool registry and connection-lifecycle orchestration.
//!
//! This crate resolves named operating modes into sets of Model Context
//! Protocol tool integrations and drives the connection lifecycle of each
//! tool behind an injected connector.
//!
//! # Architecture
//!
//! Each feature module follows hexagonal architecture principles:
//!
//! - **Domain**: Pure value types and state machines
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (files, simulated tools)
//! - **Services**: Orchestration over domain types and ports
//!
//! # Modules
//!
//! - [`tool_registry`]: Tool and mode catalog, configuration loading
//! - [`hub`]: Per-mode tool lifecycle orchestration

pub mod hub;
pub mod tool_registry;
