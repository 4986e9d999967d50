//! Connector port: the capability every tool kind implements.

use crate::hub::domain::ConnectorHealth;
use crate::tool_registry::domain::ToolDescriptor;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Transport behind one tool instance.
///
/// Each call represents an I/O round trip and must not block sibling
/// connectors.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establishes the connection.
    async fn connect(&self) -> ConnectorResult<()>;

    /// Tears the connection down.
    async fn disconnect(&self) -> ConnectorResult<()>;

    /// Reports the health of the live connection.
    async fn status(&self) -> ConnectorResult<ConnectorHealth>;
}

/// Builds connectors for tool kinds and answers dependency queries.
pub trait ConnectorProvider: Send + Sync {
    /// Returns the connector for one tool instance.
    fn connector_for(&self, descriptor: &ToolDescriptor) -> Arc<dyn Connector>;

    /// Returns whether a required capability is available.
    fn has_capability(&self, capability: &str) -> bool;
}

/// Errors returned by connectors, or raised by the hub while driving them.
#[derive(Debug, Clone, Error)]
pub enum ConnectorError {
    /// The remote side refused the connection.
    #[error("connection refused: {0}")]
    Refused(String),

    /// The call did not finish within its time limit.
    #[error("no response within {after:?}")]
    TimedOut {
        /// Time limit that elapsed.
        after: Duration,
    },

    /// The connector panicked.
    #[error("connector panicked")]
    Panicked,

    /// Generic runtime failure.
    #[error("connector runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl ConnectorError {
    /// Wraps a runtime error from a connector implementation.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
