//! The live, in-memory preferences document for one key.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use prefs_store::PreferencesStore;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::editor::PreferencesEditor;
use crate::error::{PrefsError, Result};
use crate::path::PrefPath;

/// A parsed preferences document bound to one key of a [`PreferencesStore`].
///
/// Reads go through the document's lock and always see a complete tree.
/// Changes are staged on a [`PreferencesEditor`] obtained from
/// [`Preferences::edit`] and become visible here only when the editor is
/// saved. Concurrent editors are last-write-wins.
pub struct Preferences {
    key: String,
    store: Arc<dyn PreferencesStore>,
    tree: Mutex<Map<String, Value>>,
}

impl Preferences {
    /// Load the document for `key` from `store`.
    ///
    /// A missing document yields an empty tree unless `throw_if_not_found`
    /// is set, in which case [`PrefsError::NotFound`] is returned. Nothing is
    /// written to the store here.
    pub fn load(
        key: impl Into<String>,
        store: Arc<dyn PreferencesStore>,
        throw_if_not_found: bool,
    ) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(PrefsError::empty_argument("key"));
        }

        let tree = match store.get_preferences(&key)? {
            Some(raw) => {
                let tree: Map<String, Value> = serde_json::from_str(&raw)
                    .map_err(|source| PrefsError::Parse {
                        key: key.clone(),
                        source,
                    })?;
                debug!(key = %key, bytes = raw.len(), fields = tree.len(), "loaded preferences");
                tree
            }
            None if throw_if_not_found => return Err(PrefsError::NotFound { key }),
            None => {
                debug!(key = %key, "preferences not stored; starting empty");
                Map::new()
            }
        };

        Ok(Self {
            key,
            store,
            tree: Mutex::new(tree),
        })
    }

    /// The key this document is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn store(&self) -> &dyn PreferencesStore {
        self.store.as_ref()
    }

    /// Lock the live tree.
    ///
    /// The tree is only ever replaced wholesale, so a guard recovered from a
    /// poisoned lock still holds a complete document.
    pub(crate) fn lock_tree(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the value at `path`, or `None` if no node exists there.
    ///
    /// An existing node that cannot be converted into `T` is a
    /// [`PrefsError::Decode`] error, including an explicit `null` read into a
    /// non-optional type.
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let path = PrefPath::parse(path)?;
        let tree = self.lock_tree();
        path.resolve(&tree)
            .map(|node| {
                T::deserialize(node).map_err(|source| PrefsError::Decode {
                    path: path.to_string(),
                    source,
                })
            })
            .transpose()
    }

    /// Read the value at `path`, falling back to `default` if it is missing.
    pub fn get_or<T: DeserializeOwned>(&self, path: &str, default: T) -> Result<T> {
        Ok(self.get(path)?.unwrap_or(default))
    }

    /// Read the value at `path`, falling back to `T::default()`.
    pub fn get_or_default<T: DeserializeOwned + Default>(&self, path: &str) -> Result<T> {
        Ok(self.get(path)?.unwrap_or_default())
    }

    /// Whether a node (possibly `null`) exists at `path`.
    pub fn contains(&self, path: &str) -> Result<bool> {
        let path = PrefPath::parse(path)?;
        let tree = self.lock_tree();
        Ok(path.resolve(&tree).is_some())
    }

    /// Decode the whole document into `T`.
    pub fn get_root<T: DeserializeOwned>(&self) -> Result<T> {
        let tree = self.lock_tree();
        self.decode_root(&tree)
    }

    /// Decode the whole document into `T`, or return `default` if the
    /// document has no fields.
    pub fn get_root_or<T: DeserializeOwned>(&self, default: T) -> Result<T> {
        let tree = self.lock_tree();
        if tree.is_empty() {
            return Ok(default);
        }
        self.decode_root(&tree)
    }

    fn decode_root<T: DeserializeOwned>(&self, tree: &Map<String, Value>) -> Result<T> {
        serde_json::from_value(Value::Object(tree.clone())).map_err(|source| {
            PrefsError::DecodeDocument {
                key: self.key.clone(),
                source,
            }
        })
    }

    /// A deep copy of the current tree.
    pub fn snapshot(&self) -> Value {
        Value::Object(self.lock_tree().clone())
    }

    /// The current tree as compact JSON, exactly as it would be stored.
    pub fn to_json_string(&self) -> Result<String> {
        let tree = self.lock_tree();
        serde_json::to_string(&*tree).map_err(|source| PrefsError::EncodeDocument {
            key: self.key.clone(),
            source,
        })
    }

    /// The current tree as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        let tree = self.lock_tree();
        serde_json::to_string_pretty(&*tree).map_err(|source| PrefsError::EncodeDocument {
            key: self.key.clone(),
            source,
        })
    }

    /// Start an edit session on a private copy of the current tree.
    pub fn edit(&self) -> PreferencesEditor<'_> {
        let working = self.lock_tree().clone();
        PreferencesEditor::new(self, working)
    }
}

impl fmt::Debug for Preferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.tree.try_lock().map(|t| t.len()).ok();
        f.debug_struct("Preferences")
            .field("key", &self.key)
            .field("fields", &fields)
            .finish()
    }
}
