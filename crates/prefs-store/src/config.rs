use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::directory::DirectoryPreferencesStore;
use crate::error::{StoreError, StoreResult};
use crate::memory::InMemoryPreferencesStore;
use crate::traits::PreferencesStore;

/// Which backend a [`StoreConfig`] opens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Volatile `HashMap` store; contents are lost when the process exits.
    Memory,
    /// One file per key under [`StoreConfig::root`].
    #[default]
    Directory,
}

/// Configuration for opening a preferences store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend to open.
    pub backend: StoreBackend,
    /// Root directory for the directory backend.
    pub root: PathBuf,
    /// Whether each write is fsynced before it is renamed into place.
    pub sync_on_write: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Directory,
            root: PathBuf::from(".prefs"),
            sync_on_write: false,
        }
    }
}

impl StoreConfig {
    /// A configuration for a volatile in-memory store.
    pub fn in_memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            ..Default::default()
        }
    }

    /// A configuration for a directory store rooted at `root`.
    pub fn directory(root: impl Into<PathBuf>) -> Self {
        Self {
            backend: StoreBackend::Directory,
            root: root.into(),
            ..Default::default()
        }
    }

    /// Parse a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        toml::from_str(s).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Open the configured backend.
    pub fn open(&self) -> StoreResult<Arc<dyn PreferencesStore>> {
        match self.backend {
            StoreBackend::Memory => Ok(Arc::new(InMemoryPreferencesStore::new())),
            StoreBackend::Directory => {
                if self.root.as_os_str().is_empty() {
                    return Err(StoreError::Config(
                        "directory backend requires a root path".into(),
                    ));
                }
                let store = DirectoryPreferencesStore::open(&self.root)?
                    .with_sync_on_write(self.sync_on_write);
                Ok(Arc::new(store))
            }
        }
    }
}
