//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use actkit_core::{Clock, Identity, ManualClock, PublicKey};
use actkit_store::MemoryStore;

/// Fixture clocks start here (2023-11-14T22:13:20Z).
pub const START_TIME: i64 = 1_700_000_000;

/// A publisher, a shared in-memory store and a pinned clock.
pub struct TestFixture {
    pub publisher: Identity,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
}

impl TestFixture {
    /// Create a fixture with a random publisher.
    pub fn new() -> Self {
        Self::from_identity(Identity::generate())
    }

    /// Create with a deterministic publisher from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::from_identity(Identity::from_seed(seed))
    }

    fn from_identity(publisher: Identity) -> Self {
        Self {
            publisher,
            store: Arc::new(MemoryStore::new()),
            clock: Arc::new(ManualClock::new(START_TIME)),
        }
    }

    pub fn publisher_key(&self) -> PublicKey {
        self.publisher.public_key()
    }

    /// Current fixture time.
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Move the clock forward and return the new time.
    pub fn tick(&self, secs: i64) -> i64 {
        self.clock.advance(secs)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// `count` deterministic identities, distinct from any fixture publisher seed.
pub fn grantees(count: usize) -> Vec<Identity> {
    (0..count)
        .map(|i| {
            let mut seed = [0xa0u8; 32];
            seed[..8].copy_from_slice(&(i as u64).to_le_bytes());
            Identity::from_seed(seed)
        })
        .collect()
}

/// Public keys of `identities`.
pub fn public_keys(identities: &[Identity]) -> Vec<PublicKey> {
    identities.iter().map(Identity::public_key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_fixture_is_deterministic() {
        let a = TestFixture::with_seed([1; 32]);
        let b = TestFixture::with_seed([1; 32]);
        assert_eq!(a.publisher_key(), b.publisher_key());
    }

    #[test]
    fn test_grantees_are_distinct() {
        let keys = public_keys(&grantees(4));
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_tick() {
        let fixture = TestFixture::new();
        assert_eq!(fixture.now(), START_TIME);
        assert_eq!(fixture.tick(60), START_TIME + 60);
    }
}
