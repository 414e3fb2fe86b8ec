//! # actkit core
//!
//! Pure primitives for dynamic access control: identities, key agreement,
//! the reference cipher, and content addresses.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`Identity`] - An X25519 keypair; only the [`PublicKey`] ever leaves the owner
//! - [`Session`] - Derives keys shared with a peer from the local secret
//! - [`SymmetricKey`] - 256-bit key, zeroed on drop
//! - [`StreamCipher`] - Deterministic cipher for content references
//! - [`Address`] - Content address (Blake3 hash)
//! - [`EncryptedRef`] - A reference encrypted under an access key
//! - [`Clock`] - Injectable source of Unix seconds

pub mod cipher;
pub mod crypto;
pub mod error;
pub mod time;
pub mod types;

pub use cipher::{StreamCipher, SEGMENT_SIZE};
pub use crypto::{Identity, PublicKey, Session, SymmetricKey, LOOKUP_TAG, SEAL_TAG, WRAP_TAG};
pub use error::{CoreError, Result};
pub use time::{unix_now, Clock, ManualClock, SystemClock};
pub use types::{Address, EncryptedRef};
