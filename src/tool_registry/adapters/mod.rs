//! Adapter implementations for the configuration store port.

mod file;

pub use file::JsonFileConfigStore;
