//! Lifecycle orchestration for the tool instances of one mode.
//!
//! Every per-tool connect or disconnect runs in its own spawned task. The
//! task owns its instance handle, so a caller that stops waiting does not
//! stop the transition; the instance still settles in a terminal state.

use crate::hub::{
    domain::{
        ConnectSummary, ConnectionState, ConnectorHealth, DependencyReport, HealthReport,
        HubDomainError, HubStatus, ToolInstance, ToolStatus,
    },
    ports::{Connector, ConnectorError, ConnectorProvider, ConnectorResult},
};
use crate::tool_registry::{
    domain::{HubSettings, ModeDescriptor, ToolDescriptor, ToolKind, normalize_lookup},
    services::{RegistryError, ToolRegistry},
};
use futures::FutureExt;
use futures::future::join_all;
use mockable::Clock;
use std::collections::BTreeMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

/// Service-level errors for hub operations.
#[derive(Debug, Error)]
pub enum HubError {
    /// Mode or catalog lookup failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The tool kind is not part of this hub's mode.
    #[error("tool '{0}' is not part of this hub")]
    UnknownTool(String),

    /// The hub has been shut down.
    #[error("hub has been shut down")]
    HubClosed,

    /// An instance rejected a state transition.
    #[error(transparent)]
    Domain(#[from] HubDomainError),

    /// Instance state could not be locked.
    #[error("hub state unavailable: {0}")]
    StateUnavailable(String),

    /// A spawned lifecycle task was cancelled or panicked.
    #[error("lifecycle task for tool '{kind}' did not complete: {reason}")]
    TaskFailed {
        /// Tool whose task failed.
        kind: ToolKind,
        /// Runtime-provided reason.
        reason: String,
    },
}

/// Result type for hub operations.
pub type HubResult<T> = Result<T, HubError>;

#[derive(Debug, Clone, Copy)]
struct AttemptPolicy {
    attempts: u32,
    connect_timeout: Duration,
    disconnect_timeout: Duration,
}

impl From<&HubSettings> for AttemptPolicy {
    fn from(settings: &HubSettings) -> Self {
        Self {
            attempts: settings.connect_attempts(),
            connect_timeout: settings.connect_timeout(),
            disconnect_timeout: settings.disconnect_timeout(),
        }
    }
}

/// Runs a connector call with a time limit, turning panics into errors.
async fn bounded<T, F>(operation: F, limit: Duration) -> ConnectorResult<T>
where
    F: Future<Output = ConnectorResult<T>>,
{
    match tokio::time::timeout(limit, AssertUnwindSafe(operation).catch_unwind()).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(_panic)) => Err(ConnectorError::Panicked),
        Err(_elapsed) => Err(ConnectorError::TimedOut { after: limit }),
    }
}

fn flatten<T>(kind: &ToolKind, joined: Result<HubResult<T>, JoinError>) -> HubResult<T> {
    joined.unwrap_or_else(|err| {
        Err(HubError::TaskFailed {
            kind: kind.clone(),
            reason: err.to_string(),
        })
    })
}

type SlotTable = BTreeMap<ToolKind, Arc<ToolSlot>>;

/// One instance together with its connector and transition lock.
///
/// The transition lock is held for the whole of a lifecycle operation, so at
/// most one transition is in flight per instance. The instance mutex is only
/// held for short synchronous reads and writes. Once closed, a slot refuses
/// new connects; a connect that already holds the transition lock finishes
/// before the closing release runs.
struct ToolSlot {
    descriptor: Arc<ToolDescriptor>,
    connector: Arc<dyn Connector>,
    transition: tokio::sync::Mutex<()>,
    instance: Mutex<ToolInstance>,
    closed: AtomicBool,
}

impl ToolSlot {
    fn new(descriptor: Arc<ToolDescriptor>, connector: Arc<dyn Connector>) -> Self {
        Self {
            instance: Mutex::new(ToolInstance::new(Arc::clone(&descriptor))),
            descriptor,
            connector,
            transition: tokio::sync::Mutex::new(()),
            closed: AtomicBool::new(false),
        }
    }

    fn kind(&self) -> &ToolKind {
        self.descriptor.kind()
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn with_instance<T>(
        &self,
        op: impl FnOnce(&mut ToolInstance) -> Result<T, HubDomainError>,
    ) -> HubResult<T> {
        let mut instance = self
            .instance
            .lock()
            .map_err(|err| HubError::StateUnavailable(err.to_string()))?;
        Ok(op(&mut instance)?)
    }

    fn state(&self) -> HubResult<ConnectionState> {
        self.with_instance(|instance| Ok(instance.state()))
    }

    fn snapshot(&self) -> HubResult<ToolStatus> {
        self.with_instance(|instance| Ok(instance.status()))
    }

    async fn connect(&self, clock: &impl Clock, policy: AttemptPolicy) -> HubResult<bool> {
        let _transition = self.transition.lock().await;
        if self.is_closed() {
            return Err(HubError::HubClosed);
        }
        if self.state()? == ConnectionState::Connected {
            return Ok(true);
        }

        self.with_instance(|instance| instance.begin_connect(clock))?;
        info!(tool = %self.kind(), "connecting");

        match self.attempt_connect(policy).await {
            Ok(()) => {
                let connection_id =
                    self.with_instance(|instance| instance.mark_connected(clock))?;
                info!(tool = %self.kind(), %connection_id, "connected");
                Ok(true)
            }
            Err(err) => {
                warn!(tool = %self.kind(), error = %err, "connect failed");
                self.with_instance(|instance| instance.mark_failed(err.to_string(), clock))?;
                Ok(false)
            }
        }
    }

    async fn attempt_connect(&self, policy: AttemptPolicy) -> ConnectorResult<()> {
        let mut attempt = 1;
        loop {
            debug!(tool = %self.kind(), attempt, "connect attempt");
            match bounded(self.connector.connect(), policy.connect_timeout).await {
                Ok(()) => return Ok(()),
                Err(err) if attempt >= policy.attempts => return Err(err),
                Err(err) => {
                    debug!(tool = %self.kind(), attempt, error = %err, "connect attempt failed, retrying");
                    attempt += 1;
                }
            }
        }
    }

    async fn disconnect(&self, clock: &impl Clock, policy: AttemptPolicy) -> HubResult<()> {
        let _transition = self.transition.lock().await;
        if self.state()? != ConnectionState::Connected {
            return Ok(());
        }
        self.disconnect_locked(clock, policy).await
    }

    /// Brings the instance back to `disconnected` from any settled state.
    async fn release(&self, clock: &impl Clock, policy: AttemptPolicy) -> HubResult<()> {
        let _transition = self.transition.lock().await;
        match self.state()? {
            ConnectionState::Connected => self.disconnect_locked(clock, policy).await,
            ConnectionState::Error => {
                self.with_instance(|instance| instance.reset(clock))?;
                debug!(tool = %self.kind(), "cleared failed connection");
                Ok(())
            }
            ConnectionState::Disconnected
            | ConnectionState::Connecting
            | ConnectionState::Disconnecting => Ok(()),
        }
    }

    async fn disconnect_locked(&self, clock: &impl Clock, policy: AttemptPolicy) -> HubResult<()> {
        self.with_instance(|instance| instance.begin_disconnect(clock))?;
        info!(tool = %self.kind(), "disconnecting");

        if let Err(err) = bounded(self.connector.disconnect(), policy.disconnect_timeout).await {
            warn!(tool = %self.kind(), error = %err, "disconnect failed, marking disconnected");
        }

        self.with_instance(|instance| instance.mark_disconnected(clock))?;
        info!(tool = %self.kind(), "disconnected");
        Ok(())
    }
}

/// Owns the tool instances of one mode and drives their lifecycle.
///
/// All operations take `&self`; the hub can be shared behind an `Arc` and
/// queried with [`Hub::status`] while lifecycle calls are in flight. After
/// [`Hub::shutdown`] every operation fails with [`HubError::HubClosed`].
pub struct Hub<P, C>
where
    P: ConnectorProvider,
    C: Clock + Send + Sync + 'static,
{
    mode: ModeDescriptor,
    registry: Arc<ToolRegistry>,
    provider: Arc<P>,
    clock: Arc<C>,
    policy: AttemptPolicy,
    slots: RwLock<Option<Arc<SlotTable>>>,
}

impl<P, C> Hub<P, C>
where
    P: ConnectorProvider,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a hub for `mode` with one disconnected instance per tool kind.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Registry`] wrapping
    /// [`RegistryError::UnknownMode`] when the mode is not configured; no
    /// instances are created in that case.
    pub fn initialize(
        registry: Arc<ToolRegistry>,
        mode: &str,
        provider: Arc<P>,
        clock: Arc<C>,
    ) -> HubResult<Self> {
        let mode_descriptor = registry.mode(mode)?.clone();
        let slots: SlotTable = registry
            .resolve_mode(mode)?
            .into_iter()
            .map(|descriptor| {
                let connector = provider.connector_for(&descriptor);
                (
                    descriptor.kind().clone(),
                    Arc::new(ToolSlot::new(descriptor, connector)),
                )
            })
            .collect();
        let policy = AttemptPolicy::from(registry.settings());

        info!(
            mode = %mode_descriptor.name(),
            tools = slots.len(),
            "hub initialized"
        );

        Ok(Self {
            mode: mode_descriptor,
            registry,
            provider,
            clock,
            policy,
            slots: RwLock::new(Some(Arc::new(slots))),
        })
    }

    /// Returns the hub's mode.
    #[must_use]
    pub const fn mode(&self) -> &ModeDescriptor {
        &self.mode
    }

    /// Returns the registry the hub was built from.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Returns whether [`Hub::shutdown`] has completed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !matches!(self.slots.read().as_deref(), Ok(Some(_)))
    }

    /// Connects every disconnected or failed instance concurrently.
    ///
    /// Returns once every attempt has settled. A failing tool never aborts
    /// its siblings; its failure is recorded in its instance state.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::HubClosed`] after shutdown, or
    /// [`HubError::StateUnavailable`] when instance state cannot be read.
    pub async fn connect_all(&self) -> HubResult<ConnectSummary> {
        let table = self.table()?;
        info!(mode = %self.mode.name(), tools = table.len(), "connecting tools");

        let (kinds, handles): (Vec<_>, Vec<_>) = table
            .values()
            .map(|slot| (slot.kind().clone(), self.spawn_connect(Arc::clone(slot))))
            .unzip();
        for (kind, joined) in kinds.iter().zip(join_all(handles).await) {
            if let Err(err) = flatten(kind, joined) {
                warn!(tool = %kind, error = %err, "connect did not complete");
            }
        }

        let summary = ConnectSummary::new(table.len(), count_connected(&table)?);
        if summary.all_connected() {
            info!(total = summary.total(), "all tools connected");
        } else {
            warn!(
                succeeded = summary.succeeded(),
                total = summary.total(),
                "some tools are not connected"
            );
        }
        Ok(summary)
    }

    /// Connects one instance.
    ///
    /// Returns `true` when the instance is connected afterwards, including
    /// when it already was, and `false` when the attempt failed.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UnknownTool`] when `kind` is not part of this hub
    /// and [`HubError::HubClosed`] after shutdown.
    pub async fn connect(&self, kind: &str) -> HubResult<bool> {
        let slot = self.slot(kind)?;
        let tool = slot.kind().clone();
        flatten(&tool, self.spawn_connect(slot).await)
    }

    /// Disconnects one instance; a no-op unless it is connected.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UnknownTool`] when `kind` is not part of this hub
    /// and [`HubError::HubClosed`] after shutdown.
    pub async fn disconnect(&self, kind: &str) -> HubResult<()> {
        let slot = self.slot(kind)?;
        let tool = slot.kind().clone();
        let clock = Arc::clone(&self.clock);
        let policy = self.policy;
        let handle = tokio::spawn(async move { slot.disconnect(&*clock, policy).await });
        flatten(&tool, handle.await)
    }

    /// Disconnects every connected instance and clears failed ones.
    ///
    /// Afterwards every instance is disconnected.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::HubClosed`] after shutdown.
    pub async fn disconnect_all(&self) -> HubResult<()> {
        let table = self.table()?;
        info!(mode = %self.mode.name(), "disconnecting tools");
        self.release_all(&table).await;
        Ok(())
    }

    /// Returns a snapshot of every instance.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::HubClosed`] after shutdown, or
    /// [`HubError::StateUnavailable`] when instance state cannot be read.
    pub fn status(&self) -> HubResult<HubStatus> {
        let table = self.table()?;
        let tools = table
            .values()
            .map(|slot| slot.snapshot())
            .collect::<HubResult<Vec<_>>>()?;
        Ok(HubStatus::new(self.mode.name().clone(), tools))
    }

    /// Returns the descriptors of this hub's tools in mode order.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::HubClosed`] after shutdown.
    pub fn list(&self) -> HubResult<Vec<Arc<ToolDescriptor>>> {
        let table = self.table()?;
        Ok(self
            .mode
            .tool_kinds()
            .iter()
            .filter_map(|kind| table.get(kind))
            .map(|slot| Arc::clone(&slot.descriptor))
            .collect())
    }

    /// Reports required capabilities the connector provider lacks.
    ///
    /// Instance state is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::HubClosed`] after shutdown.
    pub fn check_dependencies(&self) -> HubResult<DependencyReport> {
        let table = self.table()?;
        let report = DependencyReport::new(table.values().map(|slot| {
            let missing = slot
                .descriptor
                .required_capabilities()
                .iter()
                .filter(|capability| !self.provider.has_capability(capability))
                .cloned()
                .collect::<Vec<_>>();
            (slot.kind().clone(), missing)
        }));

        if report.is_satisfied() {
            info!(mode = %self.mode.name(), "all dependencies satisfied");
        } else {
            warn!(
                mode = %self.mode.name(),
                missing = ?report.missing_capabilities(),
                "missing dependencies"
            );
        }
        Ok(report)
    }

    /// Queries the connector health of one instance.
    ///
    /// A tool that is not connected reports [`ConnectorHealth::Unknown`]; a
    /// connector error is reported as unhealthy.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UnknownTool`] when `kind` is not part of this hub
    /// and [`HubError::HubClosed`] after shutdown.
    pub async fn check_health(&self, kind: &str) -> HubResult<HealthReport> {
        let slot = self.slot(kind)?;
        let health = if slot.state()? == ConnectionState::Connected {
            match bounded(slot.connector.status(), self.policy.connect_timeout).await {
                Ok(health) => health,
                Err(err) => {
                    warn!(tool = %slot.kind(), error = %err, "health check failed");
                    ConnectorHealth::unhealthy(err.to_string())
                }
            }
        } else {
            ConnectorHealth::Unknown
        };
        Ok(HealthReport::new(slot.kind().clone(), health, self.clock.utc()))
    }

    /// Disconnects everything, then connects everything again.
    ///
    /// Instances are preserved, not recreated.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::HubClosed`] after shutdown.
    pub async fn restart(&self) -> HubResult<ConnectSummary> {
        info!(mode = %self.mode.name(), "restarting hub");
        self.disconnect_all().await?;
        self.connect_all().await
    }

    /// Disconnects everything and releases all instances.
    ///
    /// The hub is closed before any tool is released: a concurrent connect
    /// either completes first and is then disconnected, or fails with
    /// [`HubError::HubClosed`]. The hub is terminal afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::HubClosed`] when the hub was already shut down.
    pub async fn shutdown(&self) -> HubResult<()> {
        let table = {
            let mut slots = self
                .slots
                .write()
                .map_err(|err| HubError::StateUnavailable(err.to_string()))?;
            slots.take().ok_or(HubError::HubClosed)?
        };
        info!(mode = %self.mode.name(), "shutting down hub");

        for slot in table.values() {
            slot.close();
        }
        self.release_all(&table).await;

        info!(mode = %self.mode.name(), "hub shutdown complete");
        Ok(())
    }

    async fn release_all(&self, table: &SlotTable) {
        let (kinds, handles): (Vec<_>, Vec<_>) = table
            .values()
            .map(|slot| (slot.kind().clone(), self.spawn_release(Arc::clone(slot))))
            .unzip();
        for (kind, joined) in kinds.iter().zip(join_all(handles).await) {
            if let Err(err) = flatten(kind, joined) {
                warn!(tool = %kind, error = %err, "disconnect did not complete");
            }
        }
    }

    fn table(&self) -> HubResult<Arc<SlotTable>> {
        let slots = self
            .slots
            .read()
            .map_err(|err| HubError::StateUnavailable(err.to_string()))?;
        slots.as_ref().map(Arc::clone).ok_or(HubError::HubClosed)
    }

    fn slot(&self, kind: &str) -> HubResult<Arc<ToolSlot>> {
        self.table()?
            .get(normalize_lookup(kind).as_str())
            .cloned()
            .ok_or_else(|| HubError::UnknownTool(kind.to_owned()))
    }

    fn spawn_connect(&self, slot: Arc<ToolSlot>) -> JoinHandle<HubResult<bool>> {
        let clock = Arc::clone(&self.clock);
        let policy = self.policy;
        tokio::spawn(async move { slot.connect(&*clock, policy).await })
    }

    fn spawn_release(&self, slot: Arc<ToolSlot>) -> JoinHandle<HubResult<()>> {
        let clock = Arc::clone(&self.clock);
        let policy = self.policy;
        tokio::spawn(async move { slot.release(&*clock, policy).await })
    }
}

fn count_connected(table: &SlotTable) -> HubResult<usize> {
    let mut connected = 0;
    for slot in table.values() {
        if slot.state()? == ConnectionState::Connected {
            connected += 1;
        }
    }
    Ok(connected)
}
