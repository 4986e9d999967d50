//! Per-instance connection state machine.

use super::ParseConnectionStateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection state of one tool instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Not connected; the initial state.
    Disconnected,
    /// A connect attempt is in flight.
    Connecting,
    /// Connected and usable.
    Connected,
    /// A disconnect is in flight.
    Disconnecting,
    /// The last connect attempt failed.
    Error,
}

impl ConnectionState {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnecting => "disconnecting",
            Self::Error => "error",
        }
    }

    /// Returns whether no transition is in flight.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Connecting | Self::Disconnecting)
    }

    /// Returns whether transition to `target` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Disconnected | Self::Error, Self::Connecting)
                | (Self::Connecting, Self::Connected | Self::Error)
                | (Self::Connected, Self::Disconnecting)
                | (Self::Disconnecting | Self::Error, Self::Disconnected)
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ConnectionState {
    type Error = ParseConnectionStateError;

    fn try_from(value: &str) -> Result<Self, ParseConnectionStateError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "disconnected" => Ok(Self::Disconnected),
            "connecting" => Ok(Self::Connecting),
            "connected" => Ok(Self::Connected),
            "disconnecting" => Ok(Self::Disconnecting),
            "error" => Ok(Self::Error),
            _ => Err(ParseConnectionStateError(value.to_owned())),
        }
    }
}
