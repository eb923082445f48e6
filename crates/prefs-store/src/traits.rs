use crate::error::StoreResult;

/// Key-value store for serialized preference documents.
///
/// All implementations must satisfy these invariants:
/// - A key maps to at most one blob; writes replace the previous blob whole.
/// - Writing `None` removes the key. Removing a missing key is not an error.
/// - The store never interprets blob contents.
/// - All I/O errors are propagated, never silently ignored.
pub trait PreferencesStore: Send + Sync {
    /// Read the raw document stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored for the key.
    fn get_preferences(&self, key: &str) -> StoreResult<Option<String>>;

    /// Upsert the raw document for `key`, or delete it when `value` is `None`.
    fn set_preferences(&self, key: &str, value: Option<&str>) -> StoreResult<()>;

    /// List every key that currently has a stored document, sorted.
    fn keys(&self) -> StoreResult<Vec<String>>;

    /// Check whether a document is stored under `key`.
    ///
    /// Default implementation reads the blob. Backends may override with a
    /// cheaper existence check.
    fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get_preferences(key)?.is_some())
    }

    /// Remove the document stored under `key`.
    fn remove(&self, key: &str) -> StoreResult<()> {
        self.set_preferences(key, None)
    }
}
