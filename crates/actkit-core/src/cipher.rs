//! Deterministic counter-mode stream cipher for references.
//!
//! The input is split into 32-byte segments. Segment `i` is XORed with
//! `Blake3(Blake3_keyed(key, le32(init_ctr + i)))`. Encryption and
//! decryption are the same transform, and equal inputs under equal keys
//! give equal outputs. There is no IV, so a key must only ever protect data
//! that is safe to compare for equality (here: references within one epoch).

use zeroize::Zeroize;

use crate::crypto::SymmetricKey;

/// Keystream segment size in bytes.
pub const SEGMENT_SIZE: usize = 32;

/// A keystream bound to a key and a starting counter.
#[derive(Debug)]
pub struct StreamCipher<'a> {
    key: &'a SymmetricKey,
    init_ctr: u32,
}

impl<'a> StreamCipher<'a> {
    /// Cipher starting at counter 0.
    pub fn new(key: &'a SymmetricKey) -> Self {
        Self::with_counter(key, 0)
    }

    pub fn with_counter(key: &'a SymmetricKey, init_ctr: u32) -> Self {
        Self { key, init_ctr }
    }

    /// Encrypt or decrypt `data` into a new buffer.
    pub fn apply(&self, data: &[u8]) -> Vec<u8> {
        let mut out = data.to_vec();
        self.apply_in_place(&mut out);
        out
    }

    /// Encrypt or decrypt `data` in place.
    pub fn apply_in_place(&self, data: &mut [u8]) {
        for (i, segment) in data.chunks_mut(SEGMENT_SIZE).enumerate() {
            let ctr = self.init_ctr.wrapping_add(i as u32);
            let mut keystream = segment_key(self.key, ctr);
            for (byte, k) in segment.iter_mut().zip(keystream.iter()) {
                *byte ^= k;
            }
            keystream.zeroize();
        }
    }
}

fn segment_key(key: &SymmetricKey, ctr: u32) -> [u8; SEGMENT_SIZE] {
    let inner = blake3::keyed_hash(key.as_bytes(), &ctr.to_le_bytes());
    *blake3::hash(inner.as_bytes()).as_bytes()
}
