//! Key-value storage for serialized preference documents.
//!
//! A store maps an opaque string key to an opaque string blob. The blob is
//! conventionally compact JSON, but the store never interprets it: parsing
//! and path addressing live in `prefs-core`.
//!
//! # Storage Backends
//!
//! All backends implement the [`PreferencesStore`] trait:
//!
//! - [`InMemoryPreferencesStore`] -- `HashMap`-based store for tests and embedding
//! - [`DirectoryPreferencesStore`] -- one file per key under a root directory
//!
//! [`StoreConfig`] selects and opens a backend from serde-loaded settings.
//!
//! # Design Rules
//!
//! 1. Setting a key to `None` deletes it; deleting an absent key is a no-op.
//! 2. Writes replace the whole blob. There is no partial update.
//! 3. Last write wins. Backends perform no conflict detection.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod config;
pub mod directory;
pub mod error;
pub mod memory;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use config::{StoreBackend, StoreConfig};
pub use directory::DirectoryPreferencesStore;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryPreferencesStore;
pub use traits::PreferencesStore;
