//! Error types for the controller.

use actkit_access::AccessError;
use actkit_core::CoreError;
use actkit_store::StoreError;
use thiserror::Error;

/// Errors that can occur during controller operations.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Protocol error (denied access, bad input, corrupt index).
    #[error("access error: {0}")]
    Access(#[source] AccessError),

    /// Storage error, surfaced unchanged.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Key agreement error.
    #[error("key error: {0}")]
    Core(#[from] CoreError),

    /// No publisher key was supplied.
    #[error("no publisher key provided")]
    NoPublisherKey,

    /// A grantee list reference was supplied without the history it belongs to.
    #[error("grantee list reference given without a history")]
    NoHistoryOrGranteeReference,
}

impl ControllerError {
    /// True when the caller holds no valid entry for the resolved epoch.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::Access(e) if e.is_access_denied())
    }
}

impl From<AccessError> for ControllerError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::Store(e) => Self::Store(e),
            AccessError::Core(e) => Self::Core(e),
            other => Self::Access(other),
        }
    }
}

/// Result type for controller operations.
pub type Result<T> = std::result::Result<T, ControllerError>;
