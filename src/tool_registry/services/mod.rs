//! Lookup services over the validated tool and mode catalog.

mod registry;

pub use registry::{LoadRegistryError, RegistryError, RegistryResult, ToolRegistry};
