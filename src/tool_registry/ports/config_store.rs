//! Configuration store port.

use crate::tool_registry::domain::RegistryConfig;
use camino::Utf8PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Result type for configuration store operations.
pub type ConfigStoreResult<T> = Result<T, ConfigStoreError>;

/// Source of the registry configuration, read once at start-up.
pub trait ConfigStore: Send + Sync {
    /// Loads the configuration, creating a default one if none exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError`] when the backing store cannot be read or
    /// written, or holds malformed data.
    fn load(&self) -> ConfigStoreResult<RegistryConfig>;
}

/// Errors returned by configuration store implementations.
#[derive(Debug, Clone, Error)]
pub enum ConfigStoreError {
    /// Reading or writing the configuration file failed.
    #[error("failed to access configuration file {path}: {source}")]
    Io {
        /// Path relative to the store directory.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: Arc<std::io::Error>,
    },

    /// The configuration file exists but is not a valid configuration.
    #[error("configuration file {path} is invalid: {source}")]
    Parse {
        /// Path relative to the store directory.
        path: Utf8PathBuf,
        /// Underlying JSON error.
        source: Arc<serde_json::Error>,
    },

    /// The default configuration could not be serialized.
    #[error("failed to serialize default configuration: {0}")]
    Serialize(Arc<serde_json::Error>),
}

impl ConfigStoreError {
    /// Wraps an I/O failure for `path`.
    pub fn io(path: impl Into<Utf8PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(err),
        }
    }

    /// Wraps a JSON decoding failure for `path`.
    pub fn parse(path: impl Into<Utf8PathBuf>, err: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source: Arc::new(err),
        }
    }
}
