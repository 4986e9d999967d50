//! Domain model for the tool and mode catalog.
//!
//! Descriptors are immutable once built and shared between hubs through
//! `Arc`. Raw configuration types ([`RegistryConfig`]) are validated into
//! descriptors by the registry service.

mod config;
mod descriptor;
mod error;
mod ids;

pub use config::{HubSettings, ModeConfig, RegistryConfig, ToolConfig};
pub use descriptor::{ModeDescriptor, ToolDescriptor};
pub use error::RegistryDomainError;
pub use ids::{ModeName, ToolKind};

pub(crate) use ids::normalize_lookup;
