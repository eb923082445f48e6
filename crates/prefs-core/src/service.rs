//! Entry point handing out [`Preferences`] documents by key.

use std::sync::Arc;

use prefs_store::{PreferencesStore, StoreConfig};

use crate::document::Preferences;
use crate::error::Result;

/// Loads preferences documents by key.
pub trait PreferencesService: Send + Sync {
    /// Load the document stored under `key`.
    ///
    /// Each call re-reads the store and returns a fresh document. A missing
    /// document is created empty, or reported as
    /// [`PrefsError::NotFound`](crate::PrefsError::NotFound) when
    /// `throw_if_not_found` is set.
    fn get_preferences(&self, key: &str, throw_if_not_found: bool) -> Result<Preferences>;

    /// Load the document for `key`, starting empty if nothing is stored.
    fn get_or_create(&self, key: &str) -> Result<Preferences> {
        self.get_preferences(key, false)
    }
}

/// [`PreferencesService`] backed by a single shared store.
#[derive(Clone)]
pub struct StorePreferencesService {
    store: Arc<dyn PreferencesStore>,
}

impl StorePreferencesService {
    pub fn new(store: Arc<dyn PreferencesStore>) -> Self {
        Self { store }
    }

    /// Open the store described by `config` and serve documents from it.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Ok(Self::new(config.open()?))
    }

    /// The store documents are loaded from and saved to.
    pub fn store(&self) -> &Arc<dyn PreferencesStore> {
        &self.store
    }
}

impl PreferencesService for StorePreferencesService {
    fn get_preferences(&self, key: &str, throw_if_not_found: bool) -> Result<Preferences> {
        Preferences::load(key, Arc::clone(&self.store), throw_if_not_found)
    }
}

impl std::fmt::Debug for StorePreferencesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorePreferencesService").finish_non_exhaustive()
    }
}

/// Build the shared preferences service for `store`.
pub fn preferences_service(store: Arc<dyn PreferencesStore>) -> Arc<dyn PreferencesService> {
    Arc::new(StorePreferencesService::new(store))
}
