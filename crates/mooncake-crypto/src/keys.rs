//! Object key handling
//!
//! The pipeline consumes a caller-supplied 32-byte symmetric key and does
//! no key management of its own. The key is wrapped in [`ObjectKey`] so it
//! is zeroized on drop and never shows up in debug output.

use hmac::{Hmac, Mac};
use sha3::Sha3_256;
use zeroize::Zeroize;

use mooncake_core::{MooncakeError, MooncakeResult};

use crate::KEY_SIZE;

/// Domain string mixed into the header key hash.
const KEY_HASH_DOMAIN: &[u8] = b"brig-hdr";

type HmacSha3 = Hmac<Sha3_256>;

/// A 256-bit symmetric key owned by one encryptor or decryptor.
/// Zeroized on drop.
#[derive(Clone)]
pub struct ObjectKey {
    bytes: [u8; KEY_SIZE],
}

impl ObjectKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn from_slice(bytes: &[u8]) -> MooncakeResult<Self> {
        let bytes: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| MooncakeError::BadKeyLength {
            expected: KEY_SIZE,
            got: bytes.len(),
        })?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// First 8 bytes of `HMAC-SHA3-256(key, domain)`. Stored in the object
    /// header so a reader can reject a wrong key before touching any frame.
    pub fn header_hash(&self) -> [u8; 8] {
        let mut mac =
            HmacSha3::new_from_slice(&self.bytes).expect("HMAC accepts any key length");
        mac.update(KEY_HASH_DOMAIN);
        let digest = mac.finalize().into_bytes();
        let mut out = [0u8; 8];
        out.copy_from_slice(&digest[..8]);
        out
    }
}

impl Drop for ObjectKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
