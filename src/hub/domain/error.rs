//! Error types for connection lifecycle transitions and parsing.

use super::ConnectionState;
use thiserror::Error;

/// Errors returned by tool instance state transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HubDomainError {
    /// Transitioning between two connection states is invalid.
    #[error("invalid connection state transition: {from} -> {to}")]
    InvalidTransition {
        /// Current connection state.
        from: ConnectionState,
        /// Requested target state.
        to: ConnectionState,
    },
}

/// Error returned while parsing a connection state from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown connection state: {0}")]
pub struct ParseConnectionStateError(pub String);
