//! Per-object AEAD selection
//!
//! Each stream instance builds its own cipher at construction time from
//! the header's cipher id — there is no process-wide registry. Both
//! supported ciphers use 96-bit nonces and 128-bit tags, so the frame
//! geometry is identical either way.

use std::io;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::Aes256Gcm;
use chacha20poly1305::ChaCha20Poly1305;

use mooncake_core::{CipherId, MooncakeError, MooncakeResult};

use crate::keys::ObjectKey;
use crate::NONCE_SIZE;

/// The nonce for a frame: little-endian block counter, zero padded.
pub fn block_nonce(index: u64) -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    nonce[..8].copy_from_slice(&index.to_le_bytes());
    nonce
}

pub enum AeadCipher {
    Aes(Box<Aes256Gcm>),
    ChaCha(Box<ChaCha20Poly1305>),
}

impl std::fmt::Debug for AeadCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aes(_) => f.write_str("AeadCipher::Aes(..)"),
            Self::ChaCha(_) => f.write_str("AeadCipher::ChaCha(..)"),
        }
    }
}

impl AeadCipher {
    pub fn new(id: CipherId, key: &ObjectKey) -> Self {
        match id {
            CipherId::Aes256Gcm => Self::Aes(Box::new(Aes256Gcm::new(key.as_bytes().into()))),
            CipherId::ChaCha20Poly1305 => {
                Self::ChaCha(Box::new(ChaCha20Poly1305::new(key.as_bytes().into())))
            }
        }
    }

    /// Seal one plaintext block; returns ciphertext with the tag appended.
    pub fn seal(&self, nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> MooncakeResult<Vec<u8>> {
        match self {
            Self::Aes(cipher) => cipher.encrypt(nonce.into(), plaintext),
            Self::ChaCha(cipher) => cipher.encrypt(nonce.into(), plaintext),
        }
        .map_err(|_| MooncakeError::Io(io::Error::other("AEAD seal failed")))
    }

    /// Open one frame body. Any modification of nonce or ciphertext fails
    /// tag verification and reports the offending block.
    pub fn open(
        &self,
        block: u64,
        nonce: &[u8; NONCE_SIZE],
        ciphertext: &[u8],
    ) -> MooncakeResult<Vec<u8>> {
        match self {
            Self::Aes(cipher) => cipher.decrypt(nonce.into(), ciphertext),
            Self::ChaCha(cipher) => cipher.decrypt(nonce.into(), ciphertext),
        }
        .map_err(|_| MooncakeError::AuthFailed { block })
    }
}
