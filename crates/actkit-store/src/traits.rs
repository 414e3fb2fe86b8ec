//! Store trait: the abstract interface for content-addressed blobs.
//!
//! Everything actkit persists (access indexes, grantee lists, histories) is
//! an immutable blob addressed by its Blake3 hash. Implementations include
//! SQLite and in-memory.

use async_trait::async_trait;
use bytes::Bytes;

use actkit_core::Address;

use crate::error::{Result, StoreError};

/// Async get/put over content addresses.
///
/// # Design Notes
///
/// - **Idempotent puts**: storing the same bytes twice yields the same address.
/// - **No deletes**: blobs are never removed; superseded snapshots stay readable.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Blob Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Store `data` and return its address.
    async fn put(&self, data: &[u8]) -> Result<Address>;

    /// Fetch the blob stored under `address`.
    async fn get(&self, address: &Address) -> Result<Option<Bytes>>;

    /// Check whether a blob exists.
    async fn has(&self, address: &Address) -> Result<bool>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// Fetch a blob, failing with [`StoreError::NotFound`] if it is absent.
    fn get_required(
        &self,
        address: &Address,
    ) -> impl std::future::Future<Output = Result<Bytes>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn get_required(&self, address: &Address) -> Result<Bytes> {
        self.get(address)
            .await?
            .ok_or_else(|| StoreError::NotFound(address.to_hex()))
    }
}
