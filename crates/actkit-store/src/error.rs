//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Manifest encoding or decoding error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// No blob stored under the address.
    #[error("not found: {0}")]
    NotFound(String),

    /// A new manifest was saved without any entries.
    #[error("nothing to save")]
    NothingToSave,

    /// Stored bytes do not hash to their address.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
