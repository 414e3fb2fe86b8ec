//! Proptest generators for property-based testing.

use proptest::prelude::*;

use actkit_core::{Address, Identity, PublicKey, SymmetricKey};

/// Generate an identity from a random seed.
pub fn identity() -> impl Strategy<Value = Identity> {
    any::<[u8; 32]>().prop_map(Identity::from_seed)
}

/// Generate a public key of a real identity.
pub fn public_key() -> impl Strategy<Value = PublicKey> {
    identity().prop_map(|id| id.public_key())
}

/// Generate a non-zero content address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 32]>()
        .prop_filter("zero address is the empty sentinel", |b| b != &[0u8; 32])
        .prop_map(Address::from_bytes)
}

pub fn symmetric_key() -> impl Strategy<Value = SymmetricKey> {
    any::<[u8; 32]>().prop_map(SymmetricKey::from_bytes)
}

/// Generate a valid history timestamp (positive Unix seconds).
pub fn timestamp() -> impl Strategy<Value = i64> {
    1i64..=4_102_444_800
}

/// Generate derivation tags.
pub fn tags(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// A history to build and a point in time to query it at.
#[derive(Debug, Clone)]
pub struct HistoryParams {
    /// Distinct entry timestamps, in insertion order.
    pub timestamps: Vec<i64>,
    pub query: i64,
}

impl Arbitrary for HistoryParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            prop::collection::btree_set(timestamp(), 1..16),
            timestamp(),
            any::<prop::sample::Index>(),
        )
            .prop_map(|(set, query, shuffle)| {
                let mut timestamps: Vec<i64> = set.into_iter().collect();
                let len = timestamps.len();
                timestamps.rotate_left(shuffle.index(len));
                HistoryParams { timestamps, query }
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn history_params_are_distinct(params: HistoryParams) {
            let mut sorted = params.timestamps.clone();
            sorted.sort_unstable();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), params.timestamps.len());
        }

        #[test]
        fn addresses_are_never_zero(addr in address()) {
            prop_assert!(!addr.is_zero());
        }
    }
}
