//! # actkit access
//!
//! Grant and revoke read access to content references without re-encrypting
//! the content.
//!
//! ## Key Concepts
//!
//! - **Access key**: A random symmetric key that encrypts references. One per epoch.
//! - **Access Control Index**: Maps each authorized identity's lookup key to its
//!   wrapped copy of the access key
//! - **Grantee set**: The identities authorized under the latest epoch, stored sealed
//! - **History**: Which index was active when, so old references stay readable
//!
//! ## Encryption Model
//!
//! 1. **Lookup / wrap keys**: derived from the publisher ⟷ identity DH secret
//!    with tags 0 and 1
//! 2. **Wrapped key**: `Cipher(wrap_key, access_key)` stored at `aci[lookup_key]`
//! 3. **Encrypted reference**: `Cipher(access_key, reference)`
//!
//! Revoking an identity means starting a new epoch without it. References
//! encrypted afterwards use a key the revoked identity never received.

pub mod aci;
pub mod envelope;
pub mod error;
pub mod grantee;
pub mod history;
pub mod logic;

pub use aci::AccessControlIndex;
pub use envelope::{SealFormat, SealedBlob};
pub use error::{AccessError, Result};
pub use grantee::{GranteeRef, GranteeSet};
pub use history::{history_key, History, HistoryEntry, LookupFallback};
pub use logic::AccessLogic;
