//! Copy-on-write edit sessions over a [`Preferences`] document.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::document::Preferences;
use crate::error::{PrefsError, Result};
use crate::path::PrefPath;

/// A private working copy of a [`Preferences`] tree.
///
/// Mutations only touch the copy. [`save`](Self::save) persists the copy
/// through the store and swaps it into the document in one step; dropping the
/// editor instead discards every change.
///
/// ```
/// use std::sync::Arc;
/// use prefs_core::Preferences;
/// use prefs_store::InMemoryPreferencesStore;
///
/// let store = Arc::new(InMemoryPreferencesStore::new());
/// let prefs = Preferences::load("user", store, false)?;
/// prefs
///     .edit()
///     .set("window:width", 1280)?
///     .set("theme", "dark")?
///     .save()?;
/// assert_eq!(prefs.get::<u32>("window:width")?, Some(1280));
/// # Ok::<(), prefs_core::PrefsError>(())
/// ```
#[derive(Debug)]
pub struct PreferencesEditor<'a> {
    document: &'a Preferences,
    working: Map<String, Value>,
}

impl<'a> PreferencesEditor<'a> {
    pub(crate) fn new(document: &'a Preferences, working: Map<String, Value>) -> Self {
        Self { document, working }
    }

    /// Set the value at `path`, creating missing parent objects.
    ///
    /// `None` and other values serializing to `null` are stored as an explicit
    /// `null`.
    pub fn set<T: Serialize>(&mut self, path: &str, value: T) -> Result<&mut Self> {
        let path = PrefPath::parse(path)?;
        let value = serde_json::to_value(&value).map_err(|source| PrefsError::Encode {
            path: path.to_string(),
            source,
        })?;
        path.assign(&mut self.working, value)?;
        Ok(self)
    }

    /// Replace the whole working tree with `value`.
    ///
    /// `value` must serialize to a JSON object.
    pub fn set_root<T: Serialize>(&mut self, value: T) -> Result<&mut Self> {
        let value = serde_json::to_value(&value).map_err(|source| PrefsError::EncodeDocument {
            key: self.document.key().to_string(),
            source,
        })?;
        self.working = match value {
            Value::Object(map) => map,
            Value::Null => return Err(PrefsError::empty_argument("value")),
            other => {
                return Err(PrefsError::InvalidArgument {
                    name: "value",
                    reason: format!("must serialize to a JSON object, got {}", json_kind(&other)),
                })
            }
        };
        Ok(self)
    }

    /// Remove the node at `path`. Missing nodes are ignored.
    pub fn clear(&mut self, path: &str) -> Result<&mut Self> {
        let path = PrefPath::parse(path)?;
        path.remove(&mut self.working);
        Ok(self)
    }

    /// Remove every field, leaving an empty document.
    pub fn clear_all(&mut self) -> &mut Self {
        self.working.clear();
        self
    }

    /// The staged tree.
    pub fn working(&self) -> &Map<String, Value> {
        &self.working
    }

    /// Whether the staged tree differs from the document's live tree.
    pub fn is_dirty(&self) -> bool {
        *self.document.lock_tree() != self.working
    }

    /// Persist the staged tree and make it the document's live tree.
    ///
    /// Runs under the document lock: the compact JSON is written to the store
    /// first, and the document is only updated once the write succeeded. The
    /// editor stays usable and does not alias the document afterwards.
    pub fn save(&self) -> Result<()> {
        let key = self.document.key();
        let mut live = self.document.lock_tree();
        let raw = serde_json::to_string(&self.working).map_err(|source| {
            PrefsError::EncodeDocument {
                key: key.to_string(),
                source,
            }
        })?;
        self.document.store().set_preferences(key, Some(&raw))?;
        *live = self.working.clone();
        debug!(key, bytes = raw.len(), fields = live.len(), "saved preferences");
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use prefs_store::{InMemoryPreferencesStore, PreferencesStore, StoreError, StoreResult};
    use proptest::prelude::*;
    use serde::Deserialize;
    use serde_json::json;

    /// Store whose writes always fail.
    struct ReadOnlyStore;

    impl PreferencesStore for ReadOnlyStore {
        fn get_preferences(&self, _key: &str) -> StoreResult<Option<String>> {
            Ok(Some(r#"{"a":1}"#.to_string()))
        }

        fn set_preferences(&self, _key: &str, _value: Option<&str>) -> StoreResult<()> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }

        fn keys(&self) -> StoreResult<Vec<String>> {
            Ok(vec!["k".into()])
        }
    }

    fn fresh() -> (Arc<InMemoryPreferencesStore>, Preferences) {
        let store = Arc::new(InMemoryPreferencesStore::new());
        let prefs = Preferences::load("key", store.clone(), false).unwrap();
        (store, prefs)
    }

    // -----------------------------------------------------------------------
    // set / save
    // -----------------------------------------------------------------------

    #[test]
    fn chained_set_and_save() {
        let (store, prefs) = fresh();
        prefs
            .edit()
            .set("string", "value1")
            .unwrap()
            .set("int32", 42)
            .unwrap()
            .set("nested:flag", true)
            .unwrap()
            .save()
            .unwrap();

        assert_eq!(prefs.get::<String>("string").unwrap().as_deref(), Some("value1"));
        assert_eq!(prefs.get::<i32>("int32").unwrap(), Some(42));
        assert_eq!(prefs.get::<bool>("nested:flag").unwrap(), Some(true));
        assert_eq!(
            store.get_preferences("key").unwrap().as_deref(),
            Some(r#"{"int32":42,"nested":{"flag":true},"string":"value1"}"#)
        );
    }

    #[test]
    fn set_none_stores_explicit_null() {
        let (store, prefs) = fresh();
        prefs.edit().set("maybe", None::<String>).unwrap().save().unwrap();
        assert!(prefs.contains("maybe").unwrap());
        assert_eq!(prefs.get::<Option<String>>("maybe").unwrap(), Some(None));
        assert_eq!(store.get_preferences("key").unwrap().as_deref(), Some(r#"{"maybe":null}"#));
    }

    #[test]
    fn set_rejects_empty_path() {
        let (_store, prefs) = fresh();
        let mut editor = prefs.edit();
        let err = editor.set("", 1).unwrap_err();
        assert!(matches!(err, PrefsError::InvalidArgument { name: "path", .. }));
    }

    #[test]
    fn set_through_scalar_is_path_conflict() {
        let (_store, prefs) = fresh();
        let mut editor = prefs.edit();
        editor.set("a", 1).unwrap();
        let err = editor.set("a:b", 2).unwrap_err();
        assert!(matches!(err, PrefsError::PathConflict { ref segment, .. } if segment == "a"));
        assert_eq!(editor.working().get("a"), Some(&json!(1)));
    }

    #[test]
    fn set_unencodable_value_is_encode_error() {
        use std::collections::HashMap;

        let (_store, prefs) = fresh();
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], 1);
        let err = prefs.edit().set("bad", bad).map(|_| ()).unwrap_err();
        assert!(matches!(err, PrefsError::Encode { ref path, .. } if path == "bad"));
    }

    #[test]
    fn number_read_back_as_string_fails() {
        let (_store, prefs) = fresh();
        prefs.edit().set("n", 42).unwrap().save().unwrap();
        assert_eq!(prefs.get::<i32>("n").unwrap(), Some(42));
        assert!(matches!(prefs.get::<String>("n"), Err(PrefsError::Decode { .. })));
    }

    // -----------------------------------------------------------------------
    // Whole-document set
    // -----------------------------------------------------------------------

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Settings {
        theme: String,
        font_size: u8,
        recent: Vec<String>,
    }

    #[test]
    fn set_root_then_get_root() {
        let (_store, prefs) = fresh();
        let settings = Settings {
            theme: "dark".into(),
            font_size: 14,
            recent: vec!["a.txt".into(), "b.txt".into()],
        };
        prefs.edit().set("stale", 1).unwrap().set_root(&settings).unwrap().save().unwrap();

        assert_eq!(prefs.get_root::<Settings>().unwrap(), settings);
        assert!(!prefs.contains("stale").unwrap());
    }

    #[test]
    fn set_root_rejects_null() {
        let (_store, prefs) = fresh();
        let err = prefs.edit().set_root(None::<Settings>).map(|_| ()).unwrap_err();
        assert!(matches!(err, PrefsError::InvalidArgument { name: "value", .. }));
    }

    #[test]
    fn set_root_rejects_non_object() {
        let (_store, prefs) = fresh();
        let err = prefs.edit().set_root(vec![1, 2, 3]).map(|_| ()).unwrap_err();
        match err {
            PrefsError::InvalidArgument { reason, .. } => assert!(reason.contains("an array")),
            other => panic!("unexpected error: {other}"),
        }
    }

    // -----------------------------------------------------------------------
    // clear
    // -----------------------------------------------------------------------

    #[test]
    fn clear_removes_only_target() {
        let (_store, prefs) = fresh();
        prefs
            .edit()
            .set("a:b", 1)
            .unwrap()
            .set("a:c", 2)
            .unwrap()
            .save()
            .unwrap();

        prefs
            .edit()
            .clear("a:b")
            .unwrap()
            .clear("nonexistent")
            .unwrap()
            .save()
            .unwrap();
        assert_eq!(prefs.snapshot(), json!({"a": {"c": 2}}));
    }

    #[test]
    fn clear_twice_is_noop() {
        let (_store, prefs) = fresh();
        prefs.edit().set("a", 1).unwrap().set("b", 2).unwrap().save().unwrap();

        let mut editor = prefs.edit();
        editor.clear("a").unwrap();
        let once = editor.working().clone();
        editor.clear("a").unwrap();
        assert_eq!(editor.working(), &once);
    }

    #[test]
    fn clear_rejects_empty_path() {
        let (_store, prefs) = fresh();
        let err = prefs.edit().clear("").map(|_| ()).unwrap_err();
        assert!(matches!(err, PrefsError::InvalidArgument { name: "path", .. }));
    }

    #[test]
    fn clear_all_then_default() {
        let (store, prefs) = fresh();
        prefs.edit().set("a", 1).unwrap().save().unwrap();
        prefs.edit().clear_all().save().unwrap();

        assert_eq!(prefs.get_or("a", 0).unwrap(), 0);
        assert_eq!(store.get_preferences("key").unwrap().as_deref(), Some("{}"));
    }

    // -----------------------------------------------------------------------
    // Isolation
    // -----------------------------------------------------------------------

    #[test]
    fn unsaved_edits_are_discarded() {
        let (store, prefs) = fresh();
        prefs.edit().set("kept", 42).unwrap().save().unwrap();

        {
            let mut editor = prefs.edit();
            editor.clear("kept").unwrap().set("dropped", 1).unwrap();
            assert!(editor.is_dirty());
        }

        assert_eq!(prefs.get::<i32>("kept").unwrap(), Some(42));
        assert!(!prefs.contains("dropped").unwrap());
        assert_eq!(store.get_preferences("key").unwrap().as_deref(), Some(r#"{"kept":42}"#));
    }

    #[test]
    fn editor_does_not_alias_document_after_save() {
        let (_store, prefs) = fresh();
        let mut editor = prefs.edit();
        editor.set("a", 1).unwrap();
        editor.save().unwrap();
        assert!(!editor.is_dirty());

        editor.set("a", 2).unwrap();
        assert_eq!(prefs.get::<i32>("a").unwrap(), Some(1));
        assert!(editor.is_dirty());

        editor.save().unwrap();
        assert_eq!(prefs.get::<i32>("a").unwrap(), Some(2));
    }

    #[test]
    fn failed_save_keeps_document() {
        let prefs = Preferences::load("k", Arc::new(ReadOnlyStore), true).unwrap();
        let err = prefs.edit().set("a", 2).unwrap().save().unwrap_err();
        assert!(matches!(err, PrefsError::Store(StoreError::Io(_))));
        assert_eq!(prefs.get::<i32>("a").unwrap(), Some(1));
    }

    #[test]
    fn last_save_wins() {
        let (store, prefs) = fresh();
        let mut first = prefs.edit();
        let mut second = prefs.edit();
        first.set("winner", "first").unwrap();
        second.set("other", true).unwrap();

        first.save().unwrap();
        second.save().unwrap();

        assert!(!prefs.contains("winner").unwrap());
        assert_eq!(prefs.get::<bool>("other").unwrap(), Some(true));
        assert_eq!(store.get_preferences("key").unwrap().as_deref(), Some(r#"{"other":true}"#));
    }

    #[test]
    fn concurrent_editors_on_threads() {
        let (store, prefs) = fresh();

        std::thread::scope(|scope| {
            for i in 0..8 {
                let prefs = &prefs;
                scope.spawn(move || {
                    prefs.edit().set("writer", i).unwrap().save().unwrap();
                    // Every read observes a complete document.
                    assert!(prefs.get::<i32>("writer").unwrap().is_some());
                });
            }
        });

        let winner = prefs.get::<i32>("writer").unwrap().unwrap();
        assert!((0..8).contains(&winner));
        assert_eq!(
            store.get_preferences("key").unwrap(),
            Some(prefs.to_json_string().unwrap())
        );
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn path_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z_]{1,6}", 1..5).prop_map(|segments| segments.join(":"))
    }

    proptest! {
        #[test]
        fn set_then_get_round_trips(path in path_strategy(), value in any::<i64>(), text in ".*") {
            let (_store, prefs) = fresh();
            prefs.edit().set(&path, value).unwrap().save().unwrap();
            prop_assert_eq!(prefs.get::<i64>(&path).unwrap(), Some(value));

            prefs.edit().set(&path, &text).unwrap().save().unwrap();
            prop_assert_eq!(prefs.get::<String>(&path).unwrap(), Some(text));
        }

        #[test]
        fn clear_is_idempotent(paths in prop::collection::vec(path_strategy(), 1..6), target in path_strategy()) {
            let (_store, prefs) = fresh();
            {
                let mut editor = prefs.edit();
                for (i, path) in paths.iter().enumerate() {
                    // Conflicting paths are skipped; the tree stays valid either way.
                    let _ = editor.set(path, i);
                }
                editor.save().unwrap();
            }

            let mut once = prefs.edit();
            once.clear(&target).unwrap();
            let mut twice = prefs.edit();
            twice.clear(&target).unwrap().clear(&target).unwrap();
            prop_assert_eq!(once.working(), twice.working());
        }

        #[test]
        fn missing_document_reads_default(path in path_strategy(), default in any::<i32>()) {
            let (_store, prefs) = fresh();
            prop_assert_eq!(prefs.get_or(&path, default).unwrap(), default);
        }
    }
}
