//! Live, stateful handle to one tool kind within a hub.

use super::{ActiveConnection, ConnectionId, ConnectionState, HubDomainError, ToolStatus};
use crate::tool_registry::domain::{ToolDescriptor, ToolKind};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;

/// One tool instance and its connection state.
///
/// Every successful transition stamps `last_activity`. The instance carries
/// an [`ActiveConnection`] exactly while it is connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInstance {
    descriptor: Arc<ToolDescriptor>,
    state: ConnectionState,
    last_activity: Option<DateTime<Utc>>,
    connection: Option<ActiveConnection>,
    last_error: Option<String>,
}

impl ToolInstance {
    /// Creates a disconnected instance.
    #[must_use]
    pub const fn new(descriptor: Arc<ToolDescriptor>) -> Self {
        Self {
            descriptor,
            state: ConnectionState::Disconnected,
            last_activity: None,
            connection: None,
            last_error: None,
        }
    }

    /// Returns the shared tool descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &Arc<ToolDescriptor> {
        &self.descriptor
    }

    /// Returns the tool kind.
    #[must_use]
    pub fn kind(&self) -> &ToolKind {
        self.descriptor.kind()
    }

    /// Returns the connection state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns the time of the last successful transition.
    #[must_use]
    pub const fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_activity
    }

    /// Returns the active connection while connected.
    #[must_use]
    pub const fn connection(&self) -> Option<&ActiveConnection> {
        self.connection.as_ref()
    }

    /// Returns the failure detail while in the error state.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Starts a connect attempt from `disconnected` or `error`.
    ///
    /// # Errors
    ///
    /// Returns [`HubDomainError::InvalidTransition`] from any other state.
    pub fn begin_connect(&mut self, clock: &impl Clock) -> Result<(), HubDomainError> {
        self.transition_to(ConnectionState::Connecting, clock)
    }

    /// Completes a connect attempt successfully.
    ///
    /// # Errors
    ///
    /// Returns [`HubDomainError::InvalidTransition`] unless `connecting`.
    pub fn mark_connected(&mut self, clock: &impl Clock) -> Result<ConnectionId, HubDomainError> {
        self.transition_to(ConnectionState::Connected, clock)?;
        let connection_id = ConnectionId::new();
        self.connection = Some(ActiveConnection::new(
            self.kind().clone(),
            connection_id,
            clock.utc(),
        ));
        self.last_error = None;
        Ok(connection_id)
    }

    /// Completes a connect attempt with a failure.
    ///
    /// # Errors
    ///
    /// Returns [`HubDomainError::InvalidTransition`] unless `connecting`.
    pub fn mark_failed(
        &mut self,
        reason: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), HubDomainError> {
        self.transition_to(ConnectionState::Error, clock)?;
        self.last_error = Some(reason.into());
        Ok(())
    }

    /// Starts disconnecting a connected instance.
    ///
    /// The instance leaves the active-connections view immediately.
    ///
    /// # Errors
    ///
    /// Returns [`HubDomainError::InvalidTransition`] unless `connected`.
    pub fn begin_disconnect(&mut self, clock: &impl Clock) -> Result<(), HubDomainError> {
        self.transition_to(ConnectionState::Disconnecting, clock)?;
        self.connection = None;
        Ok(())
    }

    /// Completes a disconnect.
    ///
    /// # Errors
    ///
    /// Returns [`HubDomainError::InvalidTransition`] unless `disconnecting`.
    pub fn mark_disconnected(&mut self, clock: &impl Clock) -> Result<(), HubDomainError> {
        self.require(ConnectionState::Disconnecting, ConnectionState::Disconnected)?;
        self.transition_to(ConnectionState::Disconnected, clock)
    }

    /// Clears a failed instance back to `disconnected`.
    ///
    /// # Errors
    ///
    /// Returns [`HubDomainError::InvalidTransition`] unless `error`.
    pub fn reset(&mut self, clock: &impl Clock) -> Result<(), HubDomainError> {
        self.require(ConnectionState::Error, ConnectionState::Disconnected)?;
        self.transition_to(ConnectionState::Disconnected, clock)?;
        self.last_error = None;
        Ok(())
    }

    /// Returns an owned snapshot of this instance.
    #[must_use]
    pub fn status(&self) -> ToolStatus {
        ToolStatus {
            kind: self.kind().clone(),
            display_name: self.descriptor.display_name().to_owned(),
            state: self.state,
            last_activity: self.last_activity,
            connection: self.connection.clone(),
            last_error: self.last_error.clone(),
        }
    }

    fn require(
        &self,
        expected: ConnectionState,
        target: ConnectionState,
    ) -> Result<(), HubDomainError> {
        if self.state == expected {
            return Ok(());
        }

        Err(HubDomainError::InvalidTransition {
            from: self.state,
            to: target,
        })
    }

    fn transition_to(
        &mut self,
        target: ConnectionState,
        clock: &impl Clock,
    ) -> Result<(), HubDomainError> {
        if !self.state.can_transition_to(target) {
            return Err(HubDomainError::InvalidTransition {
                from: self.state,
                to: target,
            });
        }

        self.state = target;
        self.last_activity = Some(clock.utc());
        Ok(())
    }
}
