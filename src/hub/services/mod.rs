//! Application services for tool connection lifecycles.

mod lifecycle;

pub use lifecycle::{Hub, HubError, HubResult};
