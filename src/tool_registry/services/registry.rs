//! Validated tool and mode catalog.
//!
//! [`ToolRegistry`] is built once from a [`RegistryConfig`] and shared
//! read-only between hubs. All lookups are pure.

use crate::tool_registry::{
    domain::{
        HubSettings, ModeDescriptor, ModeName, RegistryConfig, RegistryDomainError,
        ToolDescriptor, ToolKind, normalize_lookup,
    },
    ports::{ConfigStore, ConfigStoreError},
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by registry construction and lookups.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegistryError {
    /// The requested mode is not configured.
    #[error("unknown mode '{mode}' (available: {})", .available.join(", "))]
    UnknownMode {
        /// Mode name as requested.
        mode: String,
        /// Configured mode names, sorted.
        available: Vec<String>,
    },

    /// The requested tool kind is not in the master catalog.
    #[error("unknown tool kind '{0}'")]
    UnknownTool(String),

    /// A mode lists a tool kind missing from the catalog.
    #[error("mode '{mode}' references unknown tool kind '{kind}'")]
    UnknownToolInMode {
        /// Offending mode.
        mode: ModeName,
        /// Tool kind missing from the catalog.
        kind: ToolKind,
    },

    /// A mode lists the same tool kind more than once.
    #[error("mode '{mode}' lists tool kind '{kind}' more than once")]
    DuplicateToolInMode {
        /// Offending mode.
        mode: ModeName,
        /// Repeated tool kind.
        kind: ToolKind,
    },

    /// Two catalog keys normalize to the same identifier.
    #[error("configuration defines '{0}' more than once")]
    DuplicateKey(String),

    /// A configured name or descriptor failed validation.
    #[error(transparent)]
    Domain(#[from] RegistryDomainError),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Read-only catalog of tool kinds and operating modes.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<ToolKind, Arc<ToolDescriptor>>,
    modes: BTreeMap<ModeName, ModeDescriptor>,
    settings: HubSettings,
}

impl ToolRegistry {
    /// Validates `config` and builds the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when a name is invalid, a display name is
    /// empty, a key is defined twice, or a mode references a tool kind that
    /// is absent or repeated.
    pub fn new(config: RegistryConfig) -> RegistryResult<Self> {
        let RegistryConfig {
            modes: raw_modes,
            tools: raw_tools,
            settings,
        } = config;

        let mut tools = BTreeMap::new();
        for (raw_kind, tool) in raw_tools {
            let kind = ToolKind::new(raw_kind)?;
            if tools.contains_key(&kind) {
                return Err(RegistryError::DuplicateKey(kind.as_str().to_owned()));
            }
            let descriptor = ToolDescriptor::new(kind.clone(), tool.name, tool.description)?
                .with_required_capabilities(tool.dependencies)?;
            tools.insert(kind, Arc::new(descriptor));
        }

        let mut modes = BTreeMap::new();
        for (raw_mode, mode) in raw_modes {
            let name = ModeName::new(raw_mode)?;
            if modes.contains_key(&name) {
                return Err(RegistryError::DuplicateKey(name.as_str().to_owned()));
            }

            let mut seen = BTreeSet::new();
            let mut tool_kinds = Vec::with_capacity(mode.tools.len());
            for raw_kind in mode.tools {
                let kind = ToolKind::new(raw_kind)?;
                if !tools.contains_key(&kind) {
                    return Err(RegistryError::UnknownToolInMode { mode: name, kind });
                }
                if !seen.insert(kind.clone()) {
                    return Err(RegistryError::DuplicateToolInMode { mode: name, kind });
                }
                tool_kinds.push(kind);
            }

            let descriptor =
                ModeDescriptor::new(name.clone(), mode.name, mode.description, tool_kinds)?;
            modes.insert(name, descriptor);
        }

        Ok(Self {
            tools,
            modes,
            settings,
        })
    }

    /// Loads configuration from `store` and builds the registry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError`] wrapped in [`LoadRegistryError`] when the
    /// store fails, or the validation errors of [`ToolRegistry::new`].
    pub fn load(store: &impl ConfigStore) -> Result<Self, LoadRegistryError> {
        let config = store.load()?;
        Ok(Self::new(config)?)
    }

    /// Resolves a mode name into its tool descriptors, in mode order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownMode`] when the mode is not configured.
    pub fn resolve_mode(&self, mode_name: &str) -> RegistryResult<Vec<Arc<ToolDescriptor>>> {
        let mode = self.mode(mode_name)?;
        mode.tool_kinds()
            .iter()
            .map(|kind| self.describe(kind.as_str()))
            .collect()
    }

    /// Returns the descriptor of a tool kind, independent of mode.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownTool`] when the kind is not in the
    /// catalog.
    pub fn describe(&self, kind: &str) -> RegistryResult<Arc<ToolDescriptor>> {
        self.tools
            .get(normalize_lookup(kind).as_str())
            .cloned()
            .ok_or_else(|| RegistryError::UnknownTool(kind.to_owned()))
    }

    /// Returns the descriptor of a mode.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownMode`] when the mode is not configured.
    pub fn mode(&self, mode_name: &str) -> RegistryResult<&ModeDescriptor> {
        self.modes
            .get(normalize_lookup(mode_name).as_str())
            .ok_or_else(|| RegistryError::UnknownMode {
                mode: mode_name.to_owned(),
                available: self
                    .modes
                    .keys()
                    .map(|name| name.as_str().to_owned())
                    .collect(),
            })
    }

    /// Returns every mode, sorted by name.
    pub fn modes(&self) -> impl Iterator<Item = &ModeDescriptor> {
        self.modes.values()
    }

    /// Returns every tool descriptor, sorted by kind.
    pub fn tools(&self) -> impl Iterator<Item = &Arc<ToolDescriptor>> {
        self.tools.values()
    }

    /// Returns the lifecycle settings.
    #[must_use]
    pub const fn settings(&self) -> &HubSettings {
        &self.settings
    }
}

/// Errors returned by [`ToolRegistry::load`].
#[derive(Debug, Clone, Error)]
pub enum LoadRegistryError {
    /// The configuration store failed.
    #[error(transparent)]
    Store(#[from] ConfigStoreError),
    /// The loaded configuration is invalid.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
