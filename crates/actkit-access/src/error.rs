//! Error types for the access module.

use thiserror::Error;

/// Errors that can occur while granting, revoking or resolving access.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Key parsing or key agreement failed.
    #[error("core error: {0}")]
    Core(#[from] actkit_core::CoreError),

    /// Underlying storage failed.
    #[error("storage error: {0}")]
    Store(#[from] actkit_store::StoreError),

    /// The publisher has no entry in the index, so the access key is unknown.
    #[error("access key not found")]
    AccessKeyNotFound,

    /// The identity has no entry in the index.
    #[error("grantee not found")]
    GranteeNotFound,

    /// The reference is empty or the zero address.
    #[error("empty reference")]
    EmptyReference,

    /// No identity was supplied.
    #[error("no identity provided")]
    NoIdentity,

    /// An add was requested with no keys.
    #[error("no keys provided")]
    NoKeysProvided,

    /// A remove was requested with no keys.
    #[error("nothing to remove")]
    NothingToRemove,

    /// A remove was requested on an empty grantee set.
    #[error("no grantee found")]
    NoGranteeFound,

    /// Stored bytes could not be decoded or failed authentication.
    #[error("corrupt data: {0}")]
    CorruptData(String),

    /// Sealing a blob failed.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Timestamps must be positive Unix seconds.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    /// No history entry matches the query.
    #[error("history entry not found")]
    EntryNotFound,
}

impl AccessError {
    /// True when the caller is simply not authorized, as opposed to a fault.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessKeyNotFound | Self::GranteeNotFound)
    }
}

/// Result type for access operations.
pub type Result<T> = std::result::Result<T, AccessError>;
