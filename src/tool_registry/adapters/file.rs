//! JSON file configuration store backed by a capability directory.

use crate::tool_registry::{
    domain::RegistryConfig,
    ports::{ConfigStore, ConfigStoreError, ConfigStoreResult},
};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io::ErrorKind;
use tracing::info;

/// Loads `config.json` from a directory, writing the built-in default when
/// the file is absent.
///
/// An existing file that fails to parse is reported as an error and left
/// untouched.
#[derive(Debug)]
pub struct JsonFileConfigStore {
    dir: Dir,
    file_name: Utf8PathBuf,
}

impl JsonFileConfigStore {
    /// File name used when none is configured.
    pub const DEFAULT_FILE_NAME: &'static str = "config.json";

    /// Creates a store reading [`Self::DEFAULT_FILE_NAME`] inside `dir`.
    #[must_use]
    pub fn new(dir: Dir) -> Self {
        Self {
            dir,
            file_name: Utf8PathBuf::from(Self::DEFAULT_FILE_NAME),
        }
    }

    /// Opens `path` with ambient authority and creates a store over it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError::Io`] when the directory cannot be opened.
    pub fn open_ambient(path: &Utf8Path) -> ConfigStoreResult<Self> {
        let dir = Dir::open_ambient_dir(path, ambient_authority())
            .map_err(|err| ConfigStoreError::io(path, err))?;
        Ok(Self::new(dir))
    }

    /// Overrides the configuration file name.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<Utf8PathBuf>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Returns the configuration file name relative to the store directory.
    #[must_use]
    pub fn file_name(&self) -> &Utf8Path {
        &self.file_name
    }

    fn write_default(&self) -> ConfigStoreResult<RegistryConfig> {
        let config = RegistryConfig::default();
        let rendered = serde_json::to_string_pretty(&config)
            .map_err(|err| ConfigStoreError::Serialize(err.into()))?;
        self.dir
            .write(&self.file_name, rendered)
            .map_err(|err| ConfigStoreError::io(self.file_name.clone(), err))?;
        info!(path = %self.file_name, "wrote default hub configuration");
        Ok(config)
    }
}

impl ConfigStore for JsonFileConfigStore {
    fn load(&self) -> ConfigStoreResult<RegistryConfig> {
        match self.dir.read_to_string(&self.file_name) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|err| ConfigStoreError::parse(self.file_name.clone(), err)),
            Err(err) if err.kind() == ErrorKind::NotFound => self.write_default(),
            Err(err) => Err(ConfigStoreError::io(self.file_name.clone(), err)),
        }
    }
}
