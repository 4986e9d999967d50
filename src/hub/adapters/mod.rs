//! Adapter implementations for the connector port.

mod simulated;

pub use simulated::{SimulatedConnector, SimulatedConnectorProvider};
