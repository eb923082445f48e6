//! File-per-key preferences store.
//!
//! Each document lives under the root at the hex encoding of its key plus
//! `.json`. Hex-encoding keeps arbitrary keys (slashes, dots, non-ASCII)
//! filesystem-safe and round-trips exactly, so
//! [`DirectoryPreferencesStore::keys`] can report the original keys back.
//!
//! Hex names longer than [`NAME_SEGMENT_LEN`] are split into nested
//! directories of exactly that many characters, with the remainder as the
//! file stem, so no path component exceeds the filesystem name limit:
//!
//! ```text
//! <root>/6b6b...6b/6b6b...6b/6b6b.json
//!        \_ 200 _/ \_ 200 _/ \_rest_/
//! ```
//!
//! Writes are staged in a temp file next to the target and renamed into
//! place, so a reader never observes a half-written document.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::traits::PreferencesStore;

/// File extension of stored documents.
const DOCUMENT_EXT: &str = "json";

/// Hex characters per directory component of a long key.
pub const NAME_SEGMENT_LEN: usize = 200;

/// A [`PreferencesStore`] keeping one file per key under a root directory.
#[derive(Debug)]
pub struct DirectoryPreferencesStore {
    root: PathBuf,
    sync_on_write: bool,
}

impl DirectoryPreferencesStore {
    /// Open (or create) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened directory store");
        Ok(Self {
            root,
            sync_on_write: false,
        })
    }

    /// `fsync` each staged file before it is renamed into place.
    pub fn with_sync_on_write(mut self, sync: bool) -> Self {
        self.sync_on_write = sync;
        self
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding the document for `key`.
    pub fn document_path(&self, key: &str) -> PathBuf {
        let encoded = hex::encode(key.as_bytes());
        // Hex output is ASCII, so byte offsets are char boundaries.
        let mut rest = encoded.as_str();
        let mut path = self.root.clone();
        while rest.len() > NAME_SEGMENT_LEN {
            let (dir, tail) = rest.split_at(NAME_SEGMENT_LEN);
            path.push(dir);
            rest = tail;
        }
        path.push(format!("{rest}.{DOCUMENT_EXT}"));
        path
    }

    /// Recover the key from a document path relative to the root.
    fn decode_relative(relative: &Path) -> Option<String> {
        if relative.extension()? != DOCUMENT_EXT {
            return None;
        }
        let mut encoded = String::new();
        let mut components = relative.components().peekable();
        while let Some(component) = components.next() {
            let Component::Normal(name) = component else {
                return None;
            };
            if components.peek().is_some() {
                let dir = name.to_str()?;
                if dir.len() != NAME_SEGMENT_LEN {
                    return None;
                }
                encoded.push_str(dir);
            } else {
                let stem = Path::new(name).file_stem()?.to_str()?;
                if stem.len() > NAME_SEGMENT_LEN {
                    return None;
                }
                encoded.push_str(stem);
            }
        }
        let bytes = hex::decode(encoded).ok()?;
        String::from_utf8(bytes).ok()
    }

    fn write_document(&self, key: &str, raw: &str) -> StoreResult<()> {
        let path = self.document_path(key);
        let parent = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent)?;
        let mut staged = NamedTempFile::new_in(parent)?;
        staged.write_all(raw.as_bytes())?;
        staged.flush()?;
        if self.sync_on_write {
            staged.as_file().sync_all()?;
        }
        staged.persist(&path).map_err(|e| StoreError::Persist {
            key: key.to_string(),
            reason: e.error.to_string(),
        })?;
        debug!(key, bytes = raw.len(), path = %path.display(), "directory store write");
        Ok(())
    }

    fn delete_document(&self, key: &str) -> StoreResult<()> {
        let path = self.document_path(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, "directory store delete");
                self.prune_empty_dirs(&path);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove segment directories left empty by a delete, stopping at the
    /// root or at the first directory that still has entries.
    fn prune_empty_dirs(&self, document: &Path) {
        let mut dir = document.parent();
        while let Some(current) = dir {
            if current == self.root.as_path() || fs::remove_dir(current).is_err() {
                break;
            }
            dir = current.parent();
        }
    }
}

impl PreferencesStore for DirectoryPreferencesStore {
    fn get_preferences(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.document_path(key);
        match fs::read_to_string(&path) {
            Ok(raw) => {
                debug!(key, bytes = raw.len(), "directory store read");
                Ok(Some(raw))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_preferences(&self, key: &str, value: Option<&str>) -> StoreResult<()> {
        match value {
            Some(raw) => self.write_document(key, raw),
            None => self.delete_document(key),
        }
    }

    fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.document_path(key).is_file())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            match Self::decode_relative(relative) {
                Some(key) => keys.push(key),
                None => warn!("skipping foreign file in preferences store {:?}", entry.path()),
            }
        }
        keys.sort();
        Ok(keys)
    }
}
