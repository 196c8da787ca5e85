//! Error types for sharded map operations.

/// Failure raised by a [`KeyHasher`](super::hasher::KeyHasher).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct HashError {
    pub reason: String,
}

impl HashError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors returned by the sharded map.
///
/// Every variant is scoped to the single call that produced it; none of them
/// leaves shard state partially mutated.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The key is absent on `get` or `delete`.
    #[error("key '{key}' not found")]
    NotFound { key: String },

    /// The key is already present on `store`.
    #[error("key '{key}' already exists")]
    AlreadyExists { key: String },

    /// The map cannot be built with the requested layout.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The hasher failed for this key.
    #[error("failed to hash key '{key}': {source}")]
    HashFailure {
        key: String,
        #[source]
        source: HashError,
    },
}

/// Copyable discriminant of [`StoreError`], used by drivers to map outcomes
/// onto their own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidConfiguration,
    HashFailure,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            StoreError::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
            StoreError::HashFailure { .. } => ErrorKind::HashFailure,
        }
    }

    pub(crate) fn not_found(key: &str) -> Self {
        StoreError::NotFound {
            key: key.to_string(),
        }
    }

    pub(crate) fn already_exists(key: &str) -> Self {
        StoreError::AlreadyExists {
            key: key.to_string(),
        }
    }
}
