//! Keyed JSON preference documents.
//!
//! A [`PreferencesService`] turns an opaque key into a [`Preferences`]
//! document loaded from a [`PreferencesStore`](prefs_store::PreferencesStore).
//! Values are addressed with colon-delimited paths (`"window:size:width"`)
//! and converted to and from Rust types with serde.
//!
//! # Editing
//!
//! Documents are never mutated in place. [`Preferences::edit`] hands out a
//! [`PreferencesEditor`] holding a private copy of the tree; `set` and
//! `clear` calls stage changes on that copy, and
//! [`PreferencesEditor::save`] writes it to the store and swaps it into the
//! document under the document's lock. Unsaved editors leave no trace.
//!
//! # Modules
//!
//! - [`error`] — [`PrefsError`] and the crate [`Result`] alias
//! - [`path`] — [`PrefPath`] addressing and tree walking
//! - [`document`] — the live [`Preferences`] document
//! - [`editor`] — copy-on-write [`PreferencesEditor`] sessions
//! - [`service`] — [`PreferencesService`] and its store-backed implementation

pub mod document;
pub mod editor;
pub mod error;
pub mod path;
pub mod service;

pub use document::Preferences;
pub use editor::PreferencesEditor;
pub use error::{PrefsError, Result};
pub use path::{PrefPath, PATH_SEPARATOR};
pub use service::{preferences_service, PreferencesService, StorePreferencesService};

// Re-export the store layer so callers need a single dependency.
pub use prefs_store::{
    DirectoryPreferencesStore, InMemoryPreferencesStore, PreferencesStore, StoreConfig,
    StoreError,
};
