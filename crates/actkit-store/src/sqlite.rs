//! SQLite implementation of the Store trait.
//!
//! The persistent backend. Uses rusqlite with bundled SQLite, wrapped in
//! async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::trace;

use actkit_core::{unix_now, Address};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::Store;

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|e| {
                StoreError::Database(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
                    Some(format!("mutex poisoned: {}", e)),
                ))
            })?;
            f(&conn)
        })
        .await
        .map_err(|e| {
            StoreError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(format!("spawn_blocking failed: {}", e)),
            ))
        })?
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn put(&self, data: &[u8]) -> Result<Address> {
        let address = Address::digest(data);
        let data = data.to_vec();

        self.with_conn(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO blobs (address, data, stored_at) VALUES (?1, ?2, ?3)",
                params![address.as_bytes().as_slice(), data, unix_now()],
            )?;
            trace!(address = %address, new = inserted > 0, "sqlite put");
            Ok(address)
        })
        .await
    }

    async fn get(&self, address: &Address) -> Result<Option<Bytes>> {
        let address = *address;

        self.with_conn(move |conn| {
            let data: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT data FROM blobs WHERE address = ?1",
                    params![address.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;

            match data {
                Some(data) if Address::digest(&data) != address => Err(StoreError::InvalidData(
                    format!("blob {} does not match its address", address.to_hex()),
                )),
                Some(data) => Ok(Some(Bytes::from(data))),
                None => Ok(None),
            }
        })
        .await
    }

    async fn has(&self, address: &Address) -> Result<bool> {
        let address = *address;

        self.with_conn(move |conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM blobs WHERE address = ?1",
                    params![address.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get() {
        let store = SqliteStore::open_memory().unwrap();
        let address = store.put(b"payload").await.unwrap();

        let data = store.get(&address).await.unwrap().unwrap();
        assert_eq!(&data[..], b"payload");
        assert!(store.has(&address).await.unwrap());
    }

    #[tokio::test]
    async fn test_idempotent_put() {
        let store = SqliteStore::open_memory().unwrap();
        let a1 = store.put(b"twice").await.unwrap();
        let a2 = store.put(b"twice").await.unwrap();
        assert_eq!(a1, a2);
    }

    #[tokio::test]
    async fn test_missing_blob() {
        let store = SqliteStore::open_memory().unwrap();
        let address = Address::digest(b"absent");
        assert!(store.get(&address).await.unwrap().is_none());
        assert!(!store.has(&address).await.unwrap());
    }

    #[tokio::test]
    async fn test_tampered_blob_detected() {
        let store = SqliteStore::open_memory().unwrap();
        let address = store.put(b"original").await.unwrap();

        store
            .with_conn(move |conn| {
                conn.execute(
                    "UPDATE blobs SET data = ?1 WHERE address = ?2",
                    params![b"forged".to_vec(), address.as_bytes().as_slice()],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        assert!(matches!(
            store.get(&address).await,
            Err(StoreError::InvalidData(_))
        ));
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actkit.db");

        let address = {
            let store = SqliteStore::open(&path).unwrap();
            store.put(b"durable").await.unwrap()
        };

        let store = SqliteStore::open(&path).unwrap();
        let data = store.get(&address).await.unwrap().unwrap();
        assert_eq!(&data[..], b"durable");
    }
}
