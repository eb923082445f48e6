use prefs_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrefsError {
    /// A required argument was empty or had an unusable shape.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("preferences with key {key:?} not found")]
    NotFound { key: String },

    /// The stored blob for `key` is not a JSON object.
    #[error("malformed preferences document {key:?}: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The value at `path` cannot be converted into the requested type.
    #[error("cannot decode preference at '{path}': {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot decode preferences document {key:?}: {source}")]
    DecodeDocument {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode preference at '{path}': {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode preferences document {key:?}: {source}")]
    EncodeDocument {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A write walked into an existing node that is not an object.
    #[error("cannot write '{path}': segment {segment:?} is not an object")]
    PathConflict { path: String, segment: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl PrefsError {
    pub(crate) fn empty_argument(name: &'static str) -> Self {
        Self::InvalidArgument {
            name,
            reason: "must not be empty".into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PrefsError>;
