//! Sealed blob envelope.
//!
//! Grantee lists are stored encrypted so the store operator cannot read who
//! has access. The envelope carries everything except the key.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use actkit_core::SymmetricKey;

use crate::error::{AccessError, Result};

/// Format identifier for sealed blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum SealFormat {
    /// ChaCha20-Poly1305 with 256-bit key.
    ChaCha20Poly1305 = 1,
}

/// An authenticated ciphertext plus the metadata needed to open it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedBlob {
    pub format: SealFormat,
    /// Random per seal.
    pub nonce: [u8; 12],
    /// Includes the authentication tag.
    pub ciphertext: Vec<u8>,
}

impl SealedBlob {
    /// Seal `plaintext` under `key` with a fresh nonce.
    pub fn seal(plaintext: &[u8], key: &SymmetricKey) -> Result<Self> {
        let mut nonce = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut nonce);

        let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
            .map_err(|e| AccessError::Encryption(e.to_string()))?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| AccessError::Encryption(e.to_string()))?;

        Ok(Self {
            format: SealFormat::ChaCha20Poly1305,
            nonce,
            ciphertext,
        })
    }

    /// Open with `key`. Any tampering or a wrong key is `CorruptData`.
    pub fn open(&self, key: &SymmetricKey) -> Result<Vec<u8>> {
        match self.format {
            SealFormat::ChaCha20Poly1305 => {
                let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
                    .map_err(|e| AccessError::CorruptData(e.to_string()))?;
                cipher
                    .decrypt(Nonce::from_slice(&self.nonce), self.ciphertext.as_slice())
                    .map_err(|_| AccessError::CorruptData("sealed blob failed authentication".into()))
            }
        }
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| AccessError::Encryption(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| AccessError::CorruptData(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open() {
        let key = SymmetricKey::generate();
        let sealed = SealedBlob::seal(b"grantees", &key).unwrap();
        assert_eq!(sealed.open(&key).unwrap(), b"grantees");
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = SealedBlob::seal(b"grantees", &SymmetricKey::generate()).unwrap();
        assert!(matches!(
            sealed.open(&SymmetricKey::generate()),
            Err(AccessError::CorruptData(_))
        ));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = SymmetricKey::generate();
        let mut sealed = SealedBlob::seal(b"grantees", &key).unwrap();
        sealed.ciphertext[0] ^= 0x01;
        assert!(sealed.open(&key).is_err());
    }

    #[test]
    fn test_cbor_serialization() {
        let key = SymmetricKey::generate();
        let sealed = SealedBlob::seal(b"x", &key).unwrap();
        let recovered = SealedBlob::from_bytes(&sealed.to_bytes().unwrap()).unwrap();
        assert_eq!(sealed, recovered);
    }

    #[test]
    fn test_nonces_are_fresh() {
        let key = SymmetricKey::generate();
        let a = SealedBlob::seal(b"same", &key).unwrap();
        let b = SealedBlob::seal(b"same", &key).unwrap();
        assert_ne!(a.nonce, b.nonce);
    }
}
