//! Timestamp-indexed history of access control epochs.
//!
//! Each entry records which index was active from a given moment. Entries
//! are stored under `i64::MAX - timestamp`, zero-padded to 19 digits, so
//! ascending path order is newest-first and a lookup can stop at the first
//! entry that is not in the future.

use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::sync::Arc;

use actkit_core::{unix_now, Address};
use actkit_store::{Manifest, ManifestEntry, Store};
use tracing::warn;

use crate::error::{AccessError, Result};

/// What a lookup returns when every entry is newer than the query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LookupFallback {
    /// Return the earliest entry.
    #[default]
    Earliest,
    /// Fail with `EntryNotFound`.
    Strict,
}

/// One history snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub timestamp: i64,
    /// The access control index active from `timestamp`.
    pub aci: Address,
    pub metadata: BTreeMap<String, String>,
}

/// The manifest path for an entry at `timestamp`.
pub fn history_key(timestamp: i64) -> String {
    format!("{:019}", i64::MAX - timestamp)
}

fn parse_key(path: &str) -> Result<i64> {
    let reversed: i64 = path
        .parse()
        .map_err(|_| AccessError::CorruptData(format!("history key {:?}", path)))?;
    if reversed < 0 {
        return Err(AccessError::CorruptData(format!("history key {:?}", path)));
    }
    Ok(i64::MAX - reversed)
}

fn to_entry(path: &str, entry: &ManifestEntry) -> Result<HistoryEntry> {
    let aci = Address::try_from(entry.reference.as_slice())
        .map_err(|e| AccessError::CorruptData(format!("history entry {}: {}", path, e)))?;
    Ok(HistoryEntry {
        timestamp: parse_key(path)?,
        aci,
        metadata: entry.metadata.clone(),
    })
}

/// Append-only sequence of epochs for one published object.
pub struct History<S: Store + ?Sized> {
    manifest: Manifest<S>,
    fallback: LookupFallback,
}

impl<S: Store + ?Sized> History<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            manifest: Manifest::new(store),
            fallback: LookupFallback::default(),
        }
    }

    pub async fn open(store: Arc<S>, address: &Address) -> Result<Self> {
        Ok(Self {
            manifest: Manifest::open(store, address).await?,
            fallback: LookupFallback::default(),
        })
    }

    pub fn with_fallback(mut self, fallback: LookupFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Record that `aci` is active from `timestamp` (default: now).
    ///
    /// A second entry at the same timestamp replaces the first, which is
    /// returned. References encrypted under the replaced index can no longer
    /// be resolved through this history.
    pub fn add(
        &mut self,
        aci: &Address,
        timestamp: Option<i64>,
        metadata: Option<BTreeMap<String, String>>,
    ) -> Result<Option<HistoryEntry>> {
        let timestamp = timestamp.unwrap_or_else(unix_now);
        if timestamp <= 0 {
            return Err(AccessError::InvalidTimestamp(timestamp));
        }
        let key = history_key(timestamp);
        let replaced = match self.manifest.lookup(&key) {
            Some(previous) => Some(to_entry(&key, previous)?),
            None => None,
        };
        if let Some(previous) = &replaced {
            if previous.aci != *aci {
                warn!(
                    timestamp,
                    replaced = %previous.aci,
                    aci = %aci,
                    "history entry replaced at same timestamp"
                );
            }
        }

        let entry = ManifestEntry::new(aci.as_bytes().to_vec())
            .with_metadata(metadata.unwrap_or_default());
        self.manifest.add(key, entry);
        Ok(replaced)
    }

    /// The entry in effect at `timestamp`: the newest one not after it.
    pub fn lookup(&self, timestamp: i64) -> Result<HistoryEntry> {
        if timestamp <= 0 {
            return Err(AccessError::InvalidTimestamp(timestamp));
        }

        let mut earliest = None;
        let found = self.manifest.walk(|path, entry| match parse_key(path) {
            Ok(ts) if ts <= timestamp => ControlFlow::Break(to_entry(path, entry)),
            Ok(_) => {
                earliest = Some((path.to_string(), entry.clone()));
                ControlFlow::Continue(())
            }
            Err(e) => ControlFlow::Break(Err(e)),
        });

        match (found, earliest) {
            (Some(result), _) => result,
            (None, Some((path, entry))) if self.fallback == LookupFallback::Earliest => {
                to_entry(&path, &entry)
            }
            _ => Err(AccessError::EntryNotFound),
        }
    }

    /// All entries, newest first.
    pub fn entries(&self) -> Result<Vec<HistoryEntry>> {
        self.manifest
            .iter()
            .map(|(path, entry)| to_entry(path, entry))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.manifest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifest.is_empty()
    }

    /// Persist and return the history address.
    pub async fn save(&mut self) -> Result<Address> {
        Ok(self.manifest.save().await?)
    }
}
