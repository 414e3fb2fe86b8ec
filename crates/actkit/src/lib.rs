//! # actkit
//!
//! Dynamic access control for immutable, content-addressed data.
//!
//! ## Overview
//!
//! A publisher encrypts references to its content under a per-epoch access
//! key and hands each grantee a wrapped copy of that key through a public
//! index. Granting adds a wrapped copy; revoking starts a new epoch without
//! the revoked grantee. Content itself is never re-encrypted, and a history
//! keeps older references readable with the key that was current when they
//! were made.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use actkit::{Controller, ControllerConfig};
//! use actkit::core::{Address, Identity};
//! use actkit::store::SqliteStore;
//!
//! async fn example() {
//!     let store = Arc::new(SqliteStore::open("actkit.db").unwrap());
//!     let publisher = Identity::generate();
//!     let grantee = Identity::generate();
//!
//!     let ctrl = Controller::new(publisher.clone(), store.clone(), ControllerConfig::default());
//!     let grant = ctrl
//!         .handle_grantees(None, None, &publisher.public_key(), &[grantee.public_key()], &[])
//!         .await
//!         .unwrap();
//!
//!     let reference = Address::digest(b"content");
//!     let upload = ctrl
//!         .upload(&reference, &publisher.public_key(), Some(&grant.history))
//!         .await
//!         .unwrap();
//!
//!     // The grantee only needs the publisher's public key and the history.
//!     let reader = Controller::new(grantee, store, ControllerConfig::default());
//!     let now = actkit::core::unix_now();
//!     let recovered = reader
//!         .download(&upload.encrypted_ref, &publisher.public_key(), &upload.history, now)
//!         .await
//!         .unwrap();
//!     assert_eq!(recovered, reference);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `actkit::core` - Identities, sessions, the reference cipher, addresses
//! - `actkit::store` - Content-addressed storage, manifests, SQLite
//! - `actkit::access` - Access control index, grantee sets, history

pub mod controller;
pub mod error;

pub use actkit_access as access;
pub use actkit_core as core;
pub use actkit_store as store;

pub use controller::{
    Controller, ControllerConfig, GrantOutcome, UploadOutcome, GRANTEE_REF_METADATA_KEY,
};
pub use error::{ControllerError, Result};

pub use actkit_access::{GranteeRef, LookupFallback};
pub use actkit_core::{Address, EncryptedRef, Identity, PublicKey};
