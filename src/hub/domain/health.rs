//! Connector health as reported by a live tool connection.

use crate::tool_registry::domain::ToolKind;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health reported by a connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ConnectorHealth {
    /// Health cannot be determined, e.g. the tool is not connected.
    Unknown,
    /// The tool responds normally.
    Healthy,
    /// The tool is reachable but degraded.
    Unhealthy {
        /// Diagnostic detail.
        reason: String,
    },
}

impl ConnectorHealth {
    /// Creates an `unhealthy` report, trimming the reason.
    #[must_use]
    pub fn unhealthy(reason: impl Into<String>) -> Self {
        Self::Unhealthy {
            reason: reason.into().trim().to_owned(),
        }
    }

    /// Returns whether the connector reported itself healthy.
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Timestamped health check result for one tool instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    kind: ToolKind,
    health: ConnectorHealth,
    checked_at: DateTime<Utc>,
}

impl HealthReport {
    /// Creates a health report.
    #[must_use]
    pub const fn new(kind: ToolKind, health: ConnectorHealth, checked_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            health,
            checked_at,
        }
    }

    /// Returns the tool kind the report is about.
    #[must_use]
    pub const fn kind(&self) -> &ToolKind {
        &self.kind
    }

    /// Returns the reported health.
    #[must_use]
    pub const fn health(&self) -> &ConnectorHealth {
        &self.health
    }

    /// Returns when the check ran.
    #[must_use]
    pub const fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }
}
