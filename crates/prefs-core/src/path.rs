//! Colon-delimited addressing into a preferences tree.
//!
//! A path such as `"window:size:width"` names `tree["window"]["size"]["width"]`.
//! Segments are plain field names; an empty segment addresses the field named
//! `""`. Only the whole path may not be empty.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::{PrefsError, Result};

/// Separator between path segments.
pub const PATH_SEPARATOR: char = ':';

/// A validated, borrowed path into a preferences tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefPath<'a> {
    raw: &'a str,
}

impl<'a> PrefPath<'a> {
    /// Validate `raw` as a path. Fails if it is empty.
    ///
    /// ```
    /// use prefs_core::PrefPath;
    ///
    /// let path = PrefPath::parse("a:b:c").unwrap();
    /// assert_eq!(path.segments().collect::<Vec<_>>(), ["a", "b", "c"]);
    /// assert!(PrefPath::parse("").is_err());
    /// ```
    pub fn parse(raw: &'a str) -> Result<Self> {
        if raw.is_empty() {
            return Err(PrefsError::empty_argument("path"));
        }
        Ok(Self { raw })
    }

    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    /// All segments, root first.
    pub fn segments(&self) -> impl Iterator<Item = &'a str> {
        self.raw.split(PATH_SEPARATOR)
    }

    /// Number of segments in the path.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The intermediate segments and the leaf segment.
    fn split_leaf(&self) -> (impl Iterator<Item = &'a str>, &'a str) {
        let (parents, leaf) = match self.raw.rsplit_once(PATH_SEPARATOR) {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, self.raw),
        };
        (
            parents
                .into_iter()
                .flat_map(|p: &'a str| p.split(PATH_SEPARATOR)),
            leaf,
        )
    }

    /// Look up the node at this path. Non-object intermediates count as missing.
    pub fn resolve<'t>(&self, tree: &'t Map<String, Value>) -> Option<&'t Value> {
        let (parents, leaf) = self.split_leaf();
        let mut current = tree;
        for segment in parents {
            current = current.get(segment)?.as_object()?;
        }
        current.get(leaf)
    }

    /// Replace the node at this path with `value`, creating missing
    /// intermediate objects on the way.
    ///
    /// Fails with [`PrefsError::PathConflict`] if an existing intermediate
    /// node is not an object. Nodes are only created after the last existing
    /// node has been passed, so a conflict leaves `tree` untouched.
    pub fn assign(&self, tree: &mut Map<String, Value>, value: Value) -> Result<()> {
        let (parents, leaf) = self.split_leaf();
        let mut current = tree;
        for segment in parents {
            let node = current
                .entry(segment)
                .or_insert_with(|| Value::Object(Map::new()));
            current = match node {
                Value::Object(map) => map,
                _ => {
                    return Err(PrefsError::PathConflict {
                        path: self.raw.to_string(),
                        segment: segment.to_string(),
                    })
                }
            };
        }
        current.insert(leaf.to_string(), value);
        Ok(())
    }

    /// Remove the node at this path from its parent, returning it.
    /// Unresolvable paths leave the tree untouched.
    pub fn remove(&self, tree: &mut Map<String, Value>) -> Option<Value> {
        let (parents, leaf) = self.split_leaf();
        let mut current = tree;
        for segment in parents {
            current = current.get_mut(segment)?.as_object_mut()?;
        }
        current.remove(leaf)
    }
}

impl fmt::Display for PrefPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw)
    }
}
