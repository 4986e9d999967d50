//! Domain model for tool connection lifecycles.
//!
//! The hub domain models the per-instance connection state machine,
//! connection identity, connector health, and the read-only snapshots the
//! hub hands out. Concurrency and I/O remain outside this boundary.

mod error;
mod health;
mod ids;
mod instance;
mod state;
mod status;

pub use error::{HubDomainError, ParseConnectionStateError};
pub use health::{ConnectorHealth, HealthReport};
pub use ids::ConnectionId;
pub use instance::ToolInstance;
pub use state::ConnectionState;
pub use status::{ActiveConnection, ConnectSummary, DependencyReport, HubStatus, ToolStatus};
