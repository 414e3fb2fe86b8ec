//! Byte-keyed key-value stores over manifests.

use std::sync::Arc;

use async_trait::async_trait;

use actkit_core::Address;

use crate::error::Result;
use crate::manifest::{Manifest, ManifestEntry};
use crate::traits::Store;

/// A persistent map from byte keys to byte values.
///
/// Each [`save`](KeyValueStore::save) produces an immutable snapshot
/// addressed by content.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    async fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Persist and return the snapshot address.
    ///
    /// Fails with `NothingToSave` for a new store that was never written.
    async fn save(&mut self) -> Result<Address>;
}

/// [`KeyValueStore`] backed by a [`Manifest`], keys stored as hex paths.
pub struct ManifestKvs<S: Store + ?Sized> {
    manifest: Manifest<S>,
}

impl<S: Store + ?Sized> ManifestKvs<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            manifest: Manifest::new(store),
        }
    }

    pub async fn open(store: Arc<S>, address: &Address) -> Result<Self> {
        Ok(Self {
            manifest: Manifest::open(store, address).await?,
        })
    }

    pub fn len(&self) -> usize {
        self.manifest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifest.is_empty()
    }
}

#[async_trait]
impl<S: Store + ?Sized> KeyValueStore for ManifestKvs<S> {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self
            .manifest
            .lookup(&hex::encode(key))
            .map(|entry| entry.reference.clone()))
    }

    async fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.manifest
            .add(hex::encode(key), ManifestEntry::new(value.to_vec()));
        Ok(())
    }

    async fn save(&mut self) -> Result<Address> {
        self.manifest.save().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn test_put_get_save_open() {
        let store = Arc::new(MemoryStore::new());
        let mut kvs = ManifestKvs::new(store.clone());

        kvs.put(b"key1", b"value1").await.unwrap();
        kvs.put(&[0xff, 0x00], b"value2").await.unwrap();
        assert_eq!(kvs.get(b"key1").await.unwrap(), Some(b"value1".to_vec()));

        let address = kvs.save().await.unwrap();
        let opened = ManifestKvs::open(store, &address).await.unwrap();
        assert_eq!(opened.len(), 2);
        assert_eq!(
            opened.get(&[0xff, 0x00]).await.unwrap(),
            Some(b"value2".to_vec())
        );
        assert_eq!(opened.get(b"missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = Arc::new(MemoryStore::new());
        let mut kvs = ManifestKvs::new(store);
        kvs.put(b"k", b"old").await.unwrap();
        kvs.put(b"k", b"new").await.unwrap();
        assert_eq!(kvs.get(b"k").await.unwrap(), Some(b"new".to_vec()));
        assert_eq!(kvs.len(), 1);
    }

    #[tokio::test]
    async fn test_save_without_puts() {
        let store = Arc::new(MemoryStore::new());
        let mut kvs = ManifestKvs::new(store);
        assert!(matches!(kvs.save().await, Err(StoreError::NothingToSave)));
    }

    #[tokio::test]
    async fn test_reopened_save_is_stable() {
        let store = Arc::new(MemoryStore::new());
        let mut kvs = ManifestKvs::new(store.clone());
        kvs.put(b"a", b"1").await.unwrap();
        let address = kvs.save().await.unwrap();

        let mut reopened = ManifestKvs::open(store, &address).await.unwrap();
        assert_eq!(reopened.save().await.unwrap(), address);
    }
}
