//! # actkit store
//!
//! Storage abstraction for actkit. Everything is an immutable blob behind
//! a content address; mutable-looking structures are rebuilt and re-saved.
//!
//! ## Key Types
//!
//! - [`Store`] - Async get/put over content addresses
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage, one independent instance per value
//! - [`Manifest`] - Ordered path → entry directory saved as one blob
//! - [`KeyValueStore`] / [`ManifestKvs`] - Byte-keyed map over a manifest
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use actkit_store::{KeyValueStore, ManifestKvs, SqliteStore};
//!
//! async fn example() {
//!     let store = Arc::new(SqliteStore::open("actkit.db").unwrap());
//!
//!     let mut kvs = ManifestKvs::new(store.clone());
//!     kvs.put(b"key", b"value").await.unwrap();
//!     let snapshot = kvs.save().await.unwrap();
//!
//!     let reopened = ManifestKvs::open(store, &snapshot).await.unwrap();
//!     assert_eq!(reopened.get(b"key").await.unwrap(), Some(b"value".to_vec()));
//! }
//! ```

pub mod error;
pub mod kvs;
pub mod manifest;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use kvs::{KeyValueStore, ManifestKvs};
pub use manifest::{Manifest, ManifestEntry};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{Store, StoreExt};
