/// Errors from preference store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A staged write could not be moved into place.
    #[error("failed to persist {key:?}: {reason}")]
    Persist { key: String, reason: String },

    /// The store configuration could not be loaded or is invalid.
    #[error("invalid store configuration: {0}")]
    Config(String),

    /// A backend lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
