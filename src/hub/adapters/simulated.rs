//! Simulated connectors for local runs and tests.

use crate::hub::{
    domain::ConnectorHealth,
    ports::{Connector, ConnectorError, ConnectorProvider, ConnectorResult},
};
use crate::tool_registry::domain::{ToolDescriptor, ToolKind};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::debug;

/// Connector provider whose connections are a fixed delay and an in-memory
/// flag.
///
/// This adapter models tool round trips without any network or process
/// access. Failures, degraded health, slow tools and missing capabilities can
/// be injected per tool kind, and call counters are kept for assertions.
#[derive(Debug, Clone)]
pub struct SimulatedConnectorProvider {
    connect_delay: Duration,
    disconnect_delay: Duration,
    state: Arc<RwLock<SimulationState>>,
}

#[derive(Debug, Default)]
struct SimulationState {
    delay_overrides: HashMap<ToolKind, Duration>,
    failures: HashMap<ToolKind, FailurePlan>,
    unhealthy: HashMap<ToolKind, String>,
    missing_capabilities: HashSet<String>,
    connected: HashSet<ToolKind>,
    connect_attempts: HashMap<ToolKind, usize>,
    disconnect_calls: HashMap<ToolKind, usize>,
}

#[derive(Debug)]
struct FailurePlan {
    remaining: Option<usize>,
    reason: String,
}

impl SimulationState {
    fn take_failure(&mut self, kind: &ToolKind) -> Option<String> {
        let plan = self.failures.get_mut(kind)?;
        let reason = plan.reason.clone();
        let exhausted = plan.remaining.as_mut().is_some_and(|remaining| {
            *remaining = remaining.saturating_sub(1);
            *remaining == 0
        });
        if exhausted {
            self.failures.remove(kind);
        }
        Some(reason)
    }
}

fn lock_error(err: impl Display) -> ConnectorError {
    ConnectorError::runtime(std::io::Error::other(err.to_string()))
}

fn read_state(
    state: &RwLock<SimulationState>,
) -> ConnectorResult<RwLockReadGuard<'_, SimulationState>> {
    state.read().map_err(lock_error)
}

fn write_state(
    state: &RwLock<SimulationState>,
) -> ConnectorResult<RwLockWriteGuard<'_, SimulationState>> {
    state.write().map_err(lock_error)
}

impl Default for SimulatedConnectorProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedConnectorProvider {
    /// Connect delay used unless overridden.
    pub const DEFAULT_CONNECT_DELAY: Duration = Duration::from_millis(500);

    /// Disconnect delay used unless overridden.
    pub const DEFAULT_DISCONNECT_DELAY: Duration = Duration::from_millis(200);

    /// Creates a provider where every tool connects successfully.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connect_delay: Self::DEFAULT_CONNECT_DELAY,
            disconnect_delay: Self::DEFAULT_DISCONNECT_DELAY,
            state: Arc::default(),
        }
    }

    /// Sets the connect and disconnect delays for connectors built afterwards.
    #[must_use]
    pub const fn with_delays(mut self, connect: Duration, disconnect: Duration) -> Self {
        self.connect_delay = connect;
        self.disconnect_delay = disconnect;
        self
    }

    /// Overrides the connect delay of one tool kind.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Runtime`] when lock acquisition fails.
    pub fn set_connect_delay(&self, kind: ToolKind, delay: Duration) -> ConnectorResult<()> {
        write_state(&self.state)?.delay_overrides.insert(kind, delay);
        Ok(())
    }

    /// Makes every connect attempt of `kind` fail.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Runtime`] when lock acquisition fails.
    pub fn fail_connect(&self, kind: ToolKind, reason: impl Into<String>) -> ConnectorResult<()> {
        self.plan_failure(kind, None, reason.into())
    }

    /// Makes the next `times` connect attempts of `kind` fail.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Runtime`] when lock acquisition fails.
    pub fn fail_connect_times(
        &self,
        kind: ToolKind,
        times: usize,
        reason: impl Into<String>,
    ) -> ConnectorResult<()> {
        if times == 0 {
            return self.clear_failure(kind.as_str());
        }
        self.plan_failure(kind, Some(times), reason.into())
    }

    /// Removes any injected connect failure for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Runtime`] when lock acquisition fails.
    pub fn clear_failure(&self, kind: &str) -> ConnectorResult<()> {
        write_state(&self.state)?.failures.remove(kind);
        Ok(())
    }

    /// Makes a connected `kind` report itself unhealthy.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Runtime`] when lock acquisition fails.
    pub fn set_unhealthy(&self, kind: ToolKind, reason: impl Into<String>) -> ConnectorResult<()> {
        write_state(&self.state)?
            .unhealthy
            .insert(kind, reason.into().trim().to_owned());
        Ok(())
    }

    /// Reports `capability` as unavailable to dependency checks.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Runtime`] when lock acquisition fails.
    pub fn mark_capability_missing(&self, capability: impl Into<String>) -> ConnectorResult<()> {
        write_state(&self.state)?
            .missing_capabilities
            .insert(capability.into());
        Ok(())
    }

    /// Returns how many connect attempts `kind` has received.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Runtime`] when lock acquisition fails.
    pub fn connect_attempts(&self, kind: &str) -> ConnectorResult<usize> {
        Ok(read_state(&self.state)?
            .connect_attempts
            .get(kind)
            .copied()
            .unwrap_or_default())
    }

    /// Returns how many disconnect calls `kind` has received.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Runtime`] when lock acquisition fails.
    pub fn disconnect_calls(&self, kind: &str) -> ConnectorResult<usize> {
        Ok(read_state(&self.state)?
            .disconnect_calls
            .get(kind)
            .copied()
            .unwrap_or_default())
    }

    /// Returns whether the simulated transport of `kind` is connected.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Runtime`] when lock acquisition fails.
    pub fn is_connected(&self, kind: &str) -> ConnectorResult<bool> {
        Ok(read_state(&self.state)?.connected.contains(kind))
    }

    fn plan_failure(
        &self,
        kind: ToolKind,
        remaining: Option<usize>,
        reason: String,
    ) -> ConnectorResult<()> {
        write_state(&self.state)?
            .failures
            .insert(kind, FailurePlan { remaining, reason });
        Ok(())
    }
}

impl ConnectorProvider for SimulatedConnectorProvider {
    fn connector_for(&self, descriptor: &ToolDescriptor) -> Arc<dyn Connector> {
        Arc::new(SimulatedConnector {
            kind: descriptor.kind().clone(),
            connect_delay: self.connect_delay,
            disconnect_delay: self.disconnect_delay,
            state: Arc::clone(&self.state),
        })
    }

    fn has_capability(&self, capability: &str) -> bool {
        read_state(&self.state)
            .map(|state| !state.missing_capabilities.contains(capability))
            .unwrap_or(false)
    }
}

/// Connector for one tool kind, created by [`SimulatedConnectorProvider`].
#[derive(Debug)]
pub struct SimulatedConnector {
    kind: ToolKind,
    connect_delay: Duration,
    disconnect_delay: Duration,
    state: Arc<RwLock<SimulationState>>,
}

impl SimulatedConnector {
    /// Returns the simulated tool kind.
    #[must_use]
    pub const fn kind(&self) -> &ToolKind {
        &self.kind
    }
}

#[async_trait]
impl Connector for SimulatedConnector {
    async fn connect(&self) -> ConnectorResult<()> {
        let delay = {
            let mut state = write_state(&self.state)?;
            *state
                .connect_attempts
                .entry(self.kind.clone())
                .or_default() += 1;
            state
                .delay_overrides
                .get(&self.kind)
                .copied()
                .unwrap_or(self.connect_delay)
        };

        debug!(tool = %self.kind, ?delay, "simulating connect");
        tokio::time::sleep(delay).await;

        let mut state = write_state(&self.state)?;
        if let Some(reason) = state.take_failure(&self.kind) {
            return Err(ConnectorError::Refused(reason));
        }
        state.connected.insert(self.kind.clone());
        Ok(())
    }

    async fn disconnect(&self) -> ConnectorResult<()> {
        {
            let mut state = write_state(&self.state)?;
            *state
                .disconnect_calls
                .entry(self.kind.clone())
                .or_default() += 1;
        }

        debug!(tool = %self.kind, delay = ?self.disconnect_delay, "simulating disconnect");
        tokio::time::sleep(self.disconnect_delay).await;

        write_state(&self.state)?.connected.remove(&self.kind);
        Ok(())
    }

    async fn status(&self) -> ConnectorResult<ConnectorHealth> {
        let state = read_state(&self.state)?;
        if !state.connected.contains(&self.kind) {
            return Ok(ConnectorHealth::Unknown);
        }

        Ok(state
            .unhealthy
            .get(&self.kind)
            .map_or(ConnectorHealth::Healthy, |reason| {
                ConnectorHealth::unhealthy(reason.clone())
            }))
    }
}
