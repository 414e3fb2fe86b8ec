//! The set of identities authorized under the latest epoch.

use std::fmt;

use actkit_core::{Address, PublicKey, SymmetricKey};
use actkit_store::{Store, StoreExt};
use tracing::debug;

use crate::envelope::SealedBlob;
use crate::error::{AccessError, Result};

/// Ordered, duplicate-free list of grantee public keys.
///
/// The publisher is not a member unless explicitly added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GranteeSet {
    keys: Vec<PublicKey>,
}

impl GranteeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every key not already present, keeping first-seen order.
    pub fn add(&mut self, keys: &[PublicKey]) -> Result<()> {
        if keys.is_empty() {
            return Err(AccessError::NoKeysProvided);
        }
        for key in keys {
            if !self.keys.contains(key) {
                self.keys.push(*key);
            }
        }
        Ok(())
    }

    /// Drop every key in `keys`. Keys that are not members are ignored.
    pub fn remove(&mut self, keys: &[PublicKey]) -> Result<()> {
        if self.keys.is_empty() {
            return Err(AccessError::NoGranteeFound);
        }
        if keys.is_empty() {
            return Err(AccessError::NothingToRemove);
        }
        self.keys = self
            .keys
            .iter()
            .filter(|k| !keys.contains(*k))
            .copied()
            .collect();
        Ok(())
    }

    pub fn get(&self) -> &[PublicKey] {
        &self.keys
    }

    pub fn contains(&self, key: &PublicKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Concatenated 32-byte key encodings.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.keys.iter().flat_map(|k| *k.as_bytes()).collect()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % PublicKey::LEN != 0 {
            return Err(AccessError::CorruptData(format!(
                "grantee list of {} bytes is not a multiple of {}",
                bytes.len(),
                PublicKey::LEN
            )));
        }
        let keys = bytes
            .chunks_exact(PublicKey::LEN)
            .map(|chunk| {
                PublicKey::from_slice(chunk)
                    .map_err(|e| AccessError::CorruptData(format!("grantee key: {}", e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { keys })
    }

    /// Seal under a fresh key and store.
    pub async fn save<S: Store + ?Sized>(&self, store: &S) -> Result<GranteeRef> {
        let key = SymmetricKey::generate();
        let sealed = SealedBlob::seal(&self.to_bytes(), &key)?;
        let address = store.put(&sealed.to_bytes()?).await?;
        debug!(address = %address, grantees = self.keys.len(), "saved grantee list");
        Ok(GranteeRef { address, key })
    }

    pub async fn load<S: Store + ?Sized>(store: &S, reference: &GranteeRef) -> Result<Self> {
        let bytes = store.get_required(&reference.address).await?;
        let sealed = SealedBlob::from_bytes(&bytes)?;
        Self::from_bytes(&sealed.open(&reference.key)?)
    }
}

/// Locates and unlocks a sealed grantee list: blob address then blob key.
#[derive(Clone, PartialEq, Eq)]
pub struct GranteeRef {
    pub address: Address,
    pub key: SymmetricKey,
}

impl GranteeRef {
    /// Encoded size in bytes.
    pub const LEN: usize = 64;

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::LEN);
        out.extend_from_slice(self.address.as_bytes());
        out.extend_from_slice(self.key.as_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::LEN {
            return Err(AccessError::CorruptData(format!(
                "grantee reference of {} bytes",
                bytes.len()
            )));
        }
        let (address, key) = bytes.split_at(Address::LEN);
        Ok(Self {
            address: Address::try_from(address)?,
            key: SymmetricKey::from_slice(key)?,
        })
    }
}

impl fmt::Debug for GranteeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GranteeRef")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
