//! Error types for actkit core primitives.

use thiserror::Error;

/// Errors raised by key parsing and key agreement.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The peer public key is not a canonical curve point encoding.
    #[error("invalid peer public key: {0}")]
    InvalidPeerKey(String),

    /// Key agreement produced the all-zero shared secret.
    #[error("key agreement produced a degenerate shared secret")]
    DegenerateSecret,

    /// A fixed-width value had the wrong length.
    #[error("invalid length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    /// Hex decoding failed.
    #[error("hex decoding error: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
