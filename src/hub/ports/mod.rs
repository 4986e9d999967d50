//! Port contracts for tool connections.

mod connector;

pub use connector::{Connector, ConnectorError, ConnectorProvider, ConnectorResult};
