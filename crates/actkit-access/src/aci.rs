//! The Access Control Index: lookup key → wrapped access key.
//!
//! One index holds one epoch. Entries are opaque to the index; wrapping and
//! unwrapping happen in [`AccessLogic`](crate::AccessLogic).

use std::sync::Arc;

use actkit_core::{Address, SymmetricKey};
use actkit_store::{KeyValueStore, ManifestKvs, Store};

use crate::error::Result;

/// Typed view over a key-value store holding wrapped access keys.
pub struct AccessControlIndex<K> {
    kvs: K,
}

impl<S: Store + ?Sized> AccessControlIndex<ManifestKvs<S>> {
    /// Start a new, empty epoch.
    pub fn new(store: Arc<S>) -> Self {
        Self::from_kvs(ManifestKvs::new(store))
    }

    /// Load a saved epoch.
    pub async fn open(store: Arc<S>, address: &Address) -> Result<Self> {
        Ok(Self::from_kvs(ManifestKvs::open(store, address).await?))
    }

    /// Number of identities with an entry.
    pub fn len(&self) -> usize {
        self.kvs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kvs.is_empty()
    }
}

impl<K: KeyValueStore> AccessControlIndex<K> {
    pub fn from_kvs(kvs: K) -> Self {
        Self { kvs }
    }

    pub async fn wrapped_key(&self, lookup: &SymmetricKey) -> Result<Option<Vec<u8>>> {
        Ok(self.kvs.get(lookup.as_bytes()).await?)
    }

    pub async fn set_wrapped_key(&mut self, lookup: &SymmetricKey, wrapped: &[u8]) -> Result<()> {
        Ok(self.kvs.put(lookup.as_bytes(), wrapped).await?)
    }

    pub async fn save(&mut self) -> Result<Address> {
        Ok(self.kvs.save().await?)
    }
}
