//! The Controller: grant, revoke, upload and download in one place.
//!
//! The controller holds the caller's identity and a store handle, nothing
//! per object. Every operation is parameterized by the addresses returned
//! from earlier ones, so any number of objects can share one controller.

use std::collections::BTreeMap;
use std::sync::Arc;

use actkit_access::{
    AccessControlIndex, AccessError, AccessLogic, GranteeRef, GranteeSet, History, LookupFallback,
    SealedBlob,
};
use actkit_core::{
    Address, Clock, CoreError, EncryptedRef, Identity, PublicKey, SymmetricKey, SystemClock,
    SEAL_TAG,
};
use actkit_store::{ManifestKvs, Store};
use tracing::{debug, info, warn};

use crate::error::{ControllerError, Result};

/// History metadata key holding the hex sealed grantee list reference.
pub const GRANTEE_REF_METADATA_KEY: &str = "encryptedglref";

/// Configuration for the Controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// What history lookups return for timestamps before the first entry.
    pub lookup_fallback: LookupFallback,
    /// Whether grant/revoke records the sealed grantee reference in history.
    pub record_grantee_metadata: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            lookup_fallback: LookupFallback::Earliest,
            record_grantee_metadata: true,
        }
    }
}

/// Result of [`Controller::upload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// The index the reference was encrypted under.
    pub aci: Address,
    pub history: Address,
    pub encrypted_ref: EncryptedRef,
}

/// Result of [`Controller::handle_grantees`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantOutcome {
    /// Plain reference to the sealed grantee list. Keep private.
    pub grantee_ref: GranteeRef,
    /// `grantee_ref` sealed for the publisher; safe to publish.
    pub encrypted_grantee_ref: EncryptedRef,
    pub history: Address,
    /// The index now in effect.
    pub aci: Address,
}

/// Access control orchestration for one caller.
pub struct Controller<S: Store + ?Sized> {
    identity: Identity,
    logic: AccessLogic,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: ControllerConfig,
}

impl<S: Store + ?Sized> Controller<S> {
    /// Create a controller for `identity` using wall-clock time.
    pub fn new(identity: Identity, store: Arc<S>, config: ControllerConfig) -> Self {
        Self {
            logic: AccessLogic::new(identity.session()),
            identity,
            store,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The caller's public key.
    pub fn public_key(&self) -> PublicKey {
        self.identity.public_key()
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Content Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Encrypt `reference` for publication.
    ///
    /// Without a history this bootstraps a new object: a fresh index holding
    /// only the publisher and a history with one entry at the current time.
    /// With a history, the index active now is reused unchanged.
    pub async fn upload(
        &self,
        reference: &Address,
        publisher: &PublicKey,
        history: Option<&Address>,
    ) -> Result<UploadOutcome> {
        ensure_publisher(publisher)?;
        let now = self.clock.now();

        let outcome = match history {
            None => {
                let mut aci = AccessControlIndex::new(self.store.clone());
                self.logic.add_publisher(&mut aci, publisher).await?;
                let encrypted_ref = self.logic.encrypt_ref(&aci, publisher, reference).await?;

                let aci_address = aci.save().await?;
                let mut history = self.new_history();
                history.add(&aci_address, Some(now), None)?;
                let history_address = history.save().await?;

                info!(
                    publisher = %publisher,
                    aci = %aci_address,
                    history = %history_address,
                    "bootstrapped access control"
                );
                UploadOutcome {
                    aci: aci_address,
                    history: history_address,
                    encrypted_ref,
                }
            }
            Some(history_address) => {
                let history = self.open_history(history_address).await?;
                let entry = history.lookup(now)?;
                let aci = self.open_aci(&entry.aci).await?;
                let encrypted_ref = self.logic.encrypt_ref(&aci, publisher, reference).await?;

                UploadOutcome {
                    aci: entry.aci,
                    history: *history_address,
                    encrypted_ref,
                }
            }
        };

        debug!(aci = %outcome.aci, "encrypted reference");
        Ok(outcome)
    }

    /// Recover the reference behind `encrypted_ref` as of `timestamp`.
    ///
    /// Unauthorized and revoked callers get an error for which
    /// [`ControllerError::is_access_denied`] is true.
    pub async fn download(
        &self,
        encrypted_ref: &EncryptedRef,
        publisher: &PublicKey,
        history: &Address,
        timestamp: i64,
    ) -> Result<Address> {
        ensure_publisher(publisher)?;
        let history = self.open_history(history).await?;
        let entry = history.lookup(timestamp)?;
        let aci = self.open_aci(&entry.aci).await?;

        let result = self.logic.decrypt_ref(&aci, publisher, encrypted_ref).await;
        match &result {
            Ok(_) => debug!(aci = %entry.aci, timestamp, "decrypted reference"),
            Err(e) if e.is_access_denied() => warn!(
                caller = %self.public_key(),
                aci = %entry.aci,
                timestamp,
                "access denied"
            ),
            Err(_) => {}
        }
        Ok(result?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Grantee Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Add and remove grantees, rotating the access key when needed.
    ///
    /// The first grant and every revoke start a new epoch: a fresh index with
    /// a new access key, wrapped for the publisher and every remaining
    /// grantee. A pure addition to an existing list only wraps the current
    /// key for the new grantees.
    pub async fn handle_grantees(
        &self,
        encrypted_grantee_ref: Option<&EncryptedRef>,
        history: Option<&Address>,
        publisher: &PublicKey,
        add: &[PublicKey],
        remove: &[PublicKey],
    ) -> Result<GrantOutcome> {
        ensure_publisher(publisher)?;
        if encrypted_grantee_ref.is_some() && history.is_none() {
            return Err(ControllerError::NoHistoryOrGranteeReference);
        }
        if add.is_empty() && remove.is_empty() {
            return Err(AccessError::NoKeysProvided.into());
        }
        let now = self.clock.now();

        let mut history = match history {
            Some(address) => self.open_history(address).await?,
            None => self.new_history(),
        };
        let (mut grantees, had_list) = match encrypted_grantee_ref {
            Some(sealed) => (self.load_grantees(publisher, sealed).await?, true),
            None => (GranteeSet::new(), false),
        };

        if !add.is_empty() {
            grantees.add(add)?;
        }
        if !remove.is_empty() {
            grantees.remove(remove)?;
        }

        let rotate = !remove.is_empty() || !had_list;
        let mut aci = if rotate {
            let mut aci = AccessControlIndex::new(self.store.clone());
            self.logic.add_publisher(&mut aci, publisher).await?;
            for grantee in grantees.get() {
                self.logic.add_grantee(&mut aci, publisher, grantee).await?;
            }
            aci
        } else {
            let entry = history.lookup(now)?;
            let mut aci = self.open_aci(&entry.aci).await?;
            for grantee in add {
                self.logic.add_grantee(&mut aci, publisher, grantee).await?;
            }
            aci
        };

        let aci_address = aci.save().await?;
        let grantee_ref = grantees.save(&*self.store).await?;
        let encrypted_grantee_ref = self.seal_grantee_ref(publisher, &grantee_ref)?;

        let metadata = self.config.record_grantee_metadata.then(|| {
            BTreeMap::from([(
                GRANTEE_REF_METADATA_KEY.to_string(),
                encrypted_grantee_ref.to_hex(),
            )])
        });
        history.add(&aci_address, Some(now), metadata)?;
        let history_address = history.save().await?;

        info!(
            publisher = %publisher,
            added = add.len(),
            removed = remove.len(),
            grantees = grantees.len(),
            rotated = rotate,
            aci = %aci_address,
            history = %history_address,
            "updated grantees"
        );

        Ok(GrantOutcome {
            grantee_ref,
            encrypted_grantee_ref,
            history: history_address,
            aci: aci_address,
        })
    }

    /// List the grantees behind a sealed grantee reference.
    ///
    /// Only the publisher derives the right seal key. Anyone else fails
    /// authentication with `CorruptData`.
    pub async fn get_grantees(
        &self,
        publisher: &PublicKey,
        encrypted_grantee_ref: &EncryptedRef,
    ) -> Result<Vec<PublicKey>> {
        ensure_publisher(publisher)?;
        let grantees = self.load_grantees(publisher, encrypted_grantee_ref).await?;
        Ok(grantees.get().to_vec())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn new_history(&self) -> History<S> {
        History::new(self.store.clone()).with_fallback(self.config.lookup_fallback)
    }

    async fn open_history(&self, address: &Address) -> Result<History<S>> {
        Ok(History::open(self.store.clone(), address)
            .await?
            .with_fallback(self.config.lookup_fallback))
    }

    async fn open_aci(&self, address: &Address) -> Result<AccessControlIndex<ManifestKvs<S>>> {
        Ok(AccessControlIndex::open(self.store.clone(), address).await?)
    }

    fn seal_key(&self, publisher: &PublicKey) -> Result<SymmetricKey> {
        let mut keys = self.logic.session().derive(publisher, &[SEAL_TAG])?;
        keys.pop()
            .ok_or(ControllerError::Core(CoreError::DegenerateSecret))
    }

    fn seal_grantee_ref(
        &self,
        publisher: &PublicKey,
        reference: &GranteeRef,
    ) -> Result<EncryptedRef> {
        let key = self.seal_key(publisher)?;
        let sealed = SealedBlob::seal(&reference.to_bytes(), &key)?;
        Ok(EncryptedRef::from_bytes(sealed.to_bytes()?))
    }

    async fn load_grantees(
        &self,
        publisher: &PublicKey,
        sealed: &EncryptedRef,
    ) -> Result<GranteeSet> {
        let key = self.seal_key(publisher)?;
        let plain = SealedBlob::from_bytes(sealed.as_bytes())?.open(&key)?;
        let reference = GranteeRef::from_bytes(&plain)?;
        Ok(GranteeSet::load(&*self.store, &reference).await?)
    }
}

fn ensure_publisher(publisher: &PublicKey) -> Result<()> {
    if publisher.is_zero() {
        return Err(ControllerError::NoPublisherKey);
    }
    Ok(())
}
