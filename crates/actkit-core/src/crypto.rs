//! Identities and non-interactive key agreement.
//!
//! Every party is an X25519 identity. Two parties who know each other's
//! public key derive the same symmetric keys without exchanging messages:
//! `Session(a).derive(B, t) == Session(b).derive(A, t)`.

use std::fmt;

use rand::RngCore;
use x25519_dalek::StaticSecret;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CoreError, Result};

/// Tag for the key that addresses an identity's entry in an access index.
pub const LOOKUP_TAG: u8 = 0;

/// Tag for the key that wraps the access key for an identity.
pub const WRAP_TAG: u8 = 1;

/// Tag for the key a publisher seals its grantee list reference with.
///
/// Must differ from [`WRAP_TAG`]: both keys drive the stream cipher at
/// counter 0 against the publisher's own public key.
pub const SEAL_TAG: u8 = 2;

const SESSION_CONTEXT: &str = "actkit session key v1";

/// An X25519 public key in its canonical 32-byte encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Size of an encoded key in bytes.
    pub const LEN: usize = 32;

    /// The absent-identity sentinel.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Parse a canonical encoding.
    ///
    /// Rejects encodings with the high bit set and u-coordinates that are
    /// not reduced modulo 2^255 - 19, so every accepted key round-trips
    /// byte-exact.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self> {
        if !is_canonical(&bytes) {
            return Err(CoreError::InvalidPeerKey(format!(
                "non-canonical encoding {}",
                hex::encode(bytes)
            )));
        }
        Ok(Self(bytes))
    }

    /// Parse from a byte slice of exactly 32 bytes.
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let arr: [u8; 32] = slice.try_into().map_err(|_| {
            CoreError::InvalidPeerKey(format!("expected 32 bytes, got {}", slice.len()))
        })?;
        Self::from_bytes(arr)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Whether this is the absent-identity sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    fn to_dalek(self) -> x25519_dalek::PublicKey {
        x25519_dalek::PublicKey::from(self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<x25519_dalek::PublicKey> for PublicKey {
    fn from(pk: x25519_dalek::PublicKey) -> Self {
        // Scalar multiplication always yields a reduced u-coordinate.
        Self(*pk.as_bytes())
    }
}

fn is_canonical(bytes: &[u8; 32]) -> bool {
    if bytes[31] & 0x80 != 0 {
        return false;
    }
    // The only reduced-form violations left are p..2^255-1, i.e.
    // 0x7fff..ffed through 0x7fff..ffff.
    let at_or_above_p = bytes[31] == 0x7f
        && bytes[1..31].iter().all(|b| *b == 0xff)
        && bytes[0] >= 0xed;
    !at_or_above_p
}

/// A long-lived X25519 keypair.
#[derive(Clone)]
pub struct Identity {
    secret: StaticSecret,
    public: PublicKey,
}

impl Identity {
    /// Generate a new random identity.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        let identity = Self::from_seed(seed);
        seed.zeroize();
        identity
    }

    /// Restore an identity from its 32-byte secret.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let secret = StaticSecret::from(seed);
        let public = PublicKey::from(x25519_dalek::PublicKey::from(&secret));
        Self { secret, public }
    }

    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// Open a key-derivation session bound to this identity.
    pub fn session(&self) -> Session {
        Session {
            secret: self.secret.clone(),
            public: self.public,
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// Derives symmetric keys shared with a peer from one local secret.
///
/// A session holds no state beyond the secret; every call recomputes the
/// Diffie-Hellman exchange.
#[derive(Clone)]
pub struct Session {
    secret: StaticSecret,
    public: PublicKey,
}

impl Session {
    /// The public half of the local secret.
    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// Derive one key per tag from the secret shared with `peer`.
    ///
    /// Key `i` is `Blake3_derive(shared || tags[i])`. An empty tag list
    /// yields an empty vector.
    pub fn derive(&self, peer: &PublicKey, tags: &[u8]) -> Result<Vec<SymmetricKey>> {
        // Values built through `from_bytes` are already canonical; the check
        // is repeated for keys reconstructed elsewhere.
        if !is_canonical(&peer.0) {
            return Err(CoreError::InvalidPeerKey(peer.to_hex()));
        }
        let shared = self.secret.diffie_hellman(&peer.to_dalek());
        if !shared.was_contributory() {
            return Err(CoreError::DegenerateSecret);
        }

        let keys = tags
            .iter()
            .map(|tag| {
                let mut hasher = blake3::Hasher::new_derive_key(SESSION_CONTEXT);
                hasher.update(shared.as_bytes());
                hasher.update(&[*tag]);
                SymmetricKey(*hasher.finalize().as_bytes())
            })
            .collect();
        Ok(keys)
    }

    /// Derive the lookup and wrap keys for `peer`.
    pub fn derive_pair(&self, peer: &PublicKey) -> Result<(SymmetricKey, SymmetricKey)> {
        let mut keys = self.derive(peer, &[LOOKUP_TAG, WRAP_TAG])?;
        let wrap = keys.pop().ok_or(CoreError::DegenerateSecret)?;
        let lookup = keys.pop().ok_or(CoreError::DegenerateSecret)?;
        Ok((lookup, wrap))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// A 256-bit symmetric key. Zeroed on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; 32]);

impl SymmetricKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let arr: [u8; 32] = slice.try_into().map_err(|_| CoreError::InvalidLength {
            expected: 32,
            got: slice.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}
