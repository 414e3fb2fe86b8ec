//! Access key wrapping and reference encryption.
//!
//! Every epoch has one random access key. Each authorized identity gets its
//! own copy of it in the index, stored under a lookup key and encrypted with
//! a wrap key. Both keys come from the Diffie-Hellman secret shared between
//! the publisher and that identity, so either side can find and unwrap the
//! entry without talking to the other.
//!
//! Wrap keys are the same in every epoch, so each wrapped copy is a
//! [`SealedBlob`] with its own random nonce. Entries from different epochs
//! never share a keystream.

use actkit_core::{Address, EncryptedRef, PublicKey, Session, StreamCipher, SymmetricKey};
use actkit_store::KeyValueStore;
use tracing::trace;
use zeroize::Zeroizing;

use crate::aci::AccessControlIndex;
use crate::envelope::SealedBlob;
use crate::error::{AccessError, Result};

/// Publisher and grantee operations bound to the caller's own session.
///
/// `identity` arguments name the counterparty of the key agreement: a
/// publisher passes its own key for its own entry and the grantee's key when
/// granting; a grantee passes the publisher's key.
#[derive(Debug, Clone)]
pub struct AccessLogic {
    session: Session,
}

impl AccessLogic {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Start a new epoch in `aci` with a fresh access key.
    ///
    /// Calling this twice on the same index replaces the publisher's entry;
    /// grantees added before the second call can no longer unwrap a key that
    /// matches it.
    pub async fn add_publisher<K: KeyValueStore>(
        &self,
        aci: &mut AccessControlIndex<K>,
        publisher: &PublicKey,
    ) -> Result<()> {
        ensure_identity(publisher)?;
        let access_key = SymmetricKey::generate();
        self.wrap_for(aci, publisher, &access_key).await
    }

    /// Give `grantee` a wrapped copy of the epoch's access key.
    pub async fn add_grantee<K: KeyValueStore>(
        &self,
        aci: &mut AccessControlIndex<K>,
        publisher: &PublicKey,
        grantee: &PublicKey,
    ) -> Result<()> {
        ensure_identity(grantee)?;
        let access_key = self.access_key(aci, publisher).await.map_err(|e| match e {
            AccessError::GranteeNotFound => AccessError::AccessKeyNotFound,
            other => other,
        })?;
        self.wrap_for(aci, grantee, &access_key).await
    }

    /// Encrypt a content reference under the epoch's access key.
    pub async fn encrypt_ref<K: KeyValueStore>(
        &self,
        aci: &AccessControlIndex<K>,
        identity: &PublicKey,
        reference: &Address,
    ) -> Result<EncryptedRef> {
        ensure_identity(identity)?;
        if reference.is_zero() {
            return Err(AccessError::EmptyReference);
        }
        let access_key = self.access_key(aci, identity).await?;
        let ciphertext = StreamCipher::new(&access_key).apply(reference.as_bytes());
        Ok(EncryptedRef::from_bytes(ciphertext))
    }

    /// Recover a content reference encrypted under the epoch's access key.
    pub async fn decrypt_ref<K: KeyValueStore>(
        &self,
        aci: &AccessControlIndex<K>,
        identity: &PublicKey,
        encrypted: &EncryptedRef,
    ) -> Result<Address> {
        ensure_identity(identity)?;
        if encrypted.is_empty_sentinel() {
            return Err(AccessError::EmptyReference);
        }
        let access_key = self.access_key(aci, identity).await?;
        let plaintext = StreamCipher::new(&access_key).apply(encrypted.as_bytes());
        Ok(Address::try_from(plaintext.as_slice())?)
    }

    /// Unwrap the access key through the entry shared with `identity`.
    pub async fn access_key<K: KeyValueStore>(
        &self,
        aci: &AccessControlIndex<K>,
        identity: &PublicKey,
    ) -> Result<SymmetricKey> {
        ensure_identity(identity)?;
        let (lookup, wrap) = self.session.derive_pair(identity)?;
        let wrapped = aci
            .wrapped_key(&lookup)
            .await?
            .ok_or(AccessError::GranteeNotFound)?;

        let unwrapped = Zeroizing::new(SealedBlob::from_bytes(&wrapped)?.open(&wrap)?);
        SymmetricKey::from_slice(&unwrapped).map_err(|_| {
            AccessError::CorruptData(format!("access key of {} bytes", unwrapped.len()))
        })
    }

    async fn wrap_for<K: KeyValueStore>(
        &self,
        aci: &mut AccessControlIndex<K>,
        identity: &PublicKey,
        access_key: &SymmetricKey,
    ) -> Result<()> {
        let (lookup, wrap) = self.session.derive_pair(identity)?;
        let wrapped = SealedBlob::seal(access_key.as_bytes(), &wrap)?.to_bytes()?;
        aci.set_wrapped_key(&lookup, &wrapped).await?;
        trace!(identity = %identity, "wrapped access key");
        Ok(())
    }
}

fn ensure_identity(key: &PublicKey) -> Result<()> {
    if key.is_zero() {
        return Err(AccessError::NoIdentity);
    }
    Ok(())
}
