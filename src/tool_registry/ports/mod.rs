//! Port contracts for loading the registry configuration.

mod config_store;

pub use config_store::{ConfigStore, ConfigStoreError, ConfigStoreResult};
