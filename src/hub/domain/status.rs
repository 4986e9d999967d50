//! Read-only snapshots handed out by the hub.

use super::{ConnectionId, ConnectionState};
use crate::tool_registry::domain::{ModeName, ToolKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One entry of the hub's active-connections view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveConnection {
    kind: ToolKind,
    connection_id: ConnectionId,
    connected_at: DateTime<Utc>,
}

impl ActiveConnection {
    /// Creates an active connection record.
    #[must_use]
    pub const fn new(
        kind: ToolKind,
        connection_id: ConnectionId,
        connected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            connection_id,
            connected_at,
        }
    }

    /// Returns the connected tool kind.
    #[must_use]
    pub const fn kind(&self) -> &ToolKind {
        &self.kind
    }

    /// Returns the identifier of this connection.
    #[must_use]
    pub const fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Returns when the connection was established.
    #[must_use]
    pub const fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }
}

/// Snapshot of one tool instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolStatus {
    /// Tool kind.
    pub kind: ToolKind,
    /// Human-readable tool name.
    pub display_name: String,
    /// Connection state at snapshot time.
    pub state: ConnectionState,
    /// Time of the last successful state transition.
    pub last_activity: Option<DateTime<Utc>>,
    /// Present exactly when `state` is [`ConnectionState::Connected`].
    pub connection: Option<ActiveConnection>,
    /// Failure detail while `state` is [`ConnectionState::Error`].
    pub last_error: Option<String>,
}

/// Snapshot of every tool instance in a hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HubStatus {
    mode: ModeName,
    tools: BTreeMap<ToolKind, ToolStatus>,
}

impl HubStatus {
    /// Creates a hub snapshot from per-tool snapshots.
    #[must_use]
    pub fn new(mode: ModeName, tools: impl IntoIterator<Item = ToolStatus>) -> Self {
        Self {
            mode,
            tools: tools
                .into_iter()
                .map(|status| (status.kind.clone(), status))
                .collect(),
        }
    }

    /// Returns the hub's mode.
    #[must_use]
    pub const fn mode(&self) -> &ModeName {
        &self.mode
    }

    /// Returns every tool snapshot keyed by kind.
    #[must_use]
    pub const fn tools(&self) -> &BTreeMap<ToolKind, ToolStatus> {
        &self.tools
    }

    /// Returns the snapshot for `kind`, if the hub has that tool.
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&ToolStatus> {
        self.tools.get(kind)
    }

    /// Returns the state of `kind`, if the hub has that tool.
    #[must_use]
    pub fn state_of(&self, kind: &str) -> Option<ConnectionState> {
        self.get(kind).map(|status| status.state)
    }

    /// Returns the number of tools.
    #[must_use]
    pub fn total(&self) -> usize {
        self.tools.len()
    }

    /// Returns the number of tools in `state`.
    #[must_use]
    pub fn count_in(&self, state: ConnectionState) -> usize {
        self.tools
            .values()
            .filter(|status| status.state == state)
            .count()
    }

    /// Returns the active-connections view, sorted by kind.
    #[must_use]
    pub fn active_connections(&self) -> Vec<&ActiveConnection> {
        self.tools
            .values()
            .filter_map(|status| status.connection.as_ref())
            .collect()
    }
}

/// Aggregate outcome of connecting every tool in a hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectSummary {
    total: usize,
    succeeded: usize,
}

impl ConnectSummary {
    /// Creates a summary.
    #[must_use]
    pub const fn new(total: usize, succeeded: usize) -> Self {
        Self { total, succeeded }
    }

    /// Returns the number of tool instances.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Returns the number of connected tool instances.
    #[must_use]
    pub const fn succeeded(&self) -> usize {
        self.succeeded
    }

    /// Returns the number of tool instances that are not connected.
    #[must_use]
    pub const fn failed(&self) -> usize {
        self.total.saturating_sub(self.succeeded)
    }

    /// Returns whether at least one tool is connected.
    ///
    /// A partially connected hub counts as a success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.succeeded > 0
    }

    /// Returns whether every tool is connected.
    #[must_use]
    pub const fn all_connected(&self) -> bool {
        self.succeeded == self.total
    }
}

/// Required capabilities the connector provider reports as unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyReport {
    missing: BTreeMap<ToolKind, Vec<String>>,
}

impl DependencyReport {
    /// Creates a report; tools without missing capabilities are dropped.
    #[must_use]
    pub fn new(missing: impl IntoIterator<Item = (ToolKind, Vec<String>)>) -> Self {
        Self {
            missing: missing
                .into_iter()
                .filter(|(_, capabilities)| !capabilities.is_empty())
                .collect(),
        }
    }

    /// Returns whether every required capability is available.
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.missing.is_empty()
    }

    /// Returns the missing capabilities of `kind`.
    #[must_use]
    pub fn missing_for(&self, kind: &str) -> &[String] {
        self.missing
            .get(kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns every missing capability once, sorted.
    #[must_use]
    pub fn missing_capabilities(&self) -> BTreeSet<&str> {
        self.missing
            .values()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Returns the tool kinds with missing capabilities.
    pub fn affected_tools(&self) -> impl Iterator<Item = &ToolKind> {
        self.missing.keys()
    }
}
