//! Encrypted object header codec
//!
//! Fixed 36-byte layout:
//! ```text
//! offset  size  field
//!      0     8  magic "mooncake"
//!      8     2  format version, big-endian
//!     10     2  cipher id, big-endian
//!     12     8  key hash (first 8 of HMAC-SHA3-256(key, domain))
//!     20     4  plaintext block size, big-endian
//!     24    12  reserved, zero
//! ```

use mooncake_core::config::{MAX_BLOCK_SIZE, MIN_BLOCK_SIZE};
use mooncake_core::{CipherId, MooncakeError, MooncakeResult};

use crate::keys::ObjectKey;

pub const MAGIC: &[u8; 8] = b"mooncake";
pub const VERSION: u16 = 1;
pub const HEADER_SIZE: usize = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub cipher: CipherId,
    pub key_hash: [u8; 8],
    pub block_size: u32,
}

impl Header {
    pub fn new(cipher: CipherId, key: &ObjectKey, block_size: u32) -> Self {
        Self {
            cipher,
            key_hash: key.header_hash(),
            block_size,
        }
    }

    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[..8].copy_from_slice(MAGIC);
        buf[8..10].copy_from_slice(&VERSION.to_be_bytes());
        buf[10..12].copy_from_slice(&self.cipher.wire().to_be_bytes());
        buf[12..20].copy_from_slice(&self.key_hash);
        buf[20..24].copy_from_slice(&self.block_size.to_be_bytes());
        // bytes 24..36 reserved, zero
        buf
    }

    pub fn decode(buf: &[u8; HEADER_SIZE]) -> MooncakeResult<Self> {
        if &buf[..8] != MAGIC {
            return Err(MooncakeError::BadMagic {
                expected: "mooncake",
            });
        }

        let version = u16::from_be_bytes(buf[8..10].try_into().expect("fixed slice"));
        if version != VERSION {
            return Err(MooncakeError::UnsupportedVersion(version));
        }

        let cipher = CipherId::from_wire(u16::from_be_bytes(
            buf[10..12].try_into().expect("fixed slice"),
        ))?;

        let mut key_hash = [0u8; 8];
        key_hash.copy_from_slice(&buf[12..20]);

        let block_size = u32::from_be_bytes(buf[20..24].try_into().expect("fixed slice"));
        if !(MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE).contains(&block_size) {
            return Err(MooncakeError::BadBlockSize(block_size));
        }

        Ok(Self {
            cipher,
            key_hash,
            block_size,
        })
    }

    /// Compare the stored key hash against `key`.
    pub fn verify_key(&self, key: &ObjectKey) -> MooncakeResult<()> {
        if self.key_hash != key.header_hash() {
            return Err(MooncakeError::WrongKey);
        }
        Ok(())
    }
}
