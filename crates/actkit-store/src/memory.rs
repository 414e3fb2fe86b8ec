//! In-memory implementation of the Store trait.
//!
//! Same semantics as SQLite but nothing is persisted. Each instance is an
//! independent store; there is no process-wide default.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::trace;

use actkit_core::Address;

use crate::error::Result;
use crate::traits::Store;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<Address, Bytes>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct blobs held.
    pub fn len(&self) -> usize {
        self.blobs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn put(&self, data: &[u8]) -> Result<Address> {
        let address = Address::digest(data);
        let mut blobs = self.blobs.write().unwrap();
        blobs
            .entry(address)
            .or_insert_with(|| Bytes::copy_from_slice(data));
        trace!(address = %address, len = data.len(), "memory put");
        Ok(address)
    }

    async fn get(&self, address: &Address) -> Result<Option<Bytes>> {
        let blobs = self.blobs.read().unwrap();
        Ok(blobs.get(address).cloned())
    }

    async fn has(&self, address: &Address) -> Result<bool> {
        let blobs = self.blobs.read().unwrap();
        Ok(blobs.contains_key(address))
    }
}
