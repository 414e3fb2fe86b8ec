//! Ordered path → entry directories persisted as a single blob.
//!
//! A manifest is loaded whole on open and written whole on save. Paths sort
//! lexicographically, which histories rely on for reverse-chronological
//! traversal.

use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use actkit_core::Address;

use crate::error::{Result, StoreError};
use crate::traits::{Store, StoreExt};

const MANIFEST_VERSION: u8 = 1;

/// A manifest entry: an opaque reference plus string metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub reference: Vec<u8>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl ManifestEntry {
    pub fn new(reference: impl Into<Vec<u8>>) -> Self {
        Self {
            reference: reference.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Serialize, Deserialize)]
struct ManifestDoc {
    version: u8,
    entries: BTreeMap<String, ManifestEntry>,
}

/// A mutable view over a manifest snapshot.
pub struct Manifest<S: Store + ?Sized> {
    store: Arc<S>,
    entries: BTreeMap<String, ManifestEntry>,
    /// Address of the snapshot this view was loaded from or last saved to.
    saved: Option<Address>,
    dirty: bool,
}

impl<S: Store + ?Sized> Manifest<S> {
    /// Create an empty manifest.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            entries: BTreeMap::new(),
            saved: None,
            dirty: false,
        }
    }

    /// Load a manifest snapshot.
    pub async fn open(store: Arc<S>, address: &Address) -> Result<Self> {
        let bytes = store.get_required(address).await?;
        let doc: ManifestDoc = ciborium::from_reader(&bytes[..])
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        if doc.version != MANIFEST_VERSION {
            return Err(StoreError::Serialization(format!(
                "unsupported manifest version {}",
                doc.version
            )));
        }

        Ok(Self {
            store,
            entries: doc.entries,
            saved: Some(*address),
            dirty: false,
        })
    }

    /// Insert or replace the entry at `path`.
    pub fn add(&mut self, path: impl Into<String>, entry: ManifestEntry) {
        self.entries.insert(path.into(), entry);
        self.dirty = true;
    }

    pub fn lookup(&self, path: &str) -> Option<&ManifestEntry> {
        self.entries.get(path)
    }

    /// Visit entries in path order until `f` breaks.
    pub fn walk<B, F>(&self, mut f: F) -> Option<B>
    where
        F: FnMut(&str, &ManifestEntry) -> ControlFlow<B>,
    {
        for (path, entry) in &self.entries {
            if let ControlFlow::Break(b) = f(path, entry) {
                return Some(b);
            }
        }
        None
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Address of the last loaded or saved snapshot.
    pub fn address(&self) -> Option<Address> {
        self.saved
    }

    /// The store this manifest persists to.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Persist the manifest.
    ///
    /// An unmodified manifest returns the address it was loaded from without
    /// writing. A new manifest with no entries fails with
    /// [`StoreError::NothingToSave`].
    pub async fn save(&mut self) -> Result<Address> {
        if !self.dirty {
            return self.saved.ok_or(StoreError::NothingToSave);
        }

        let doc = ManifestDoc {
            version: MANIFEST_VERSION,
            entries: self.entries.clone(),
        };
        let mut buf = Vec::new();
        ciborium::into_writer(&doc, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let address = self.store.put(&buf).await?;
        self.saved = Some(address);
        self.dirty = false;
        Ok(address)
    }
}
