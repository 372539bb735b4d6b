use serde::{Deserialize, Serialize};

use crate::error::MooncakeError;

/// Cipher suite identifier as recorded in the encrypted object header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CipherId {
    Aes256Gcm,
    ChaCha20Poly1305,
}

impl CipherId {
    /// Wire value stored in the header's cipher field.
    pub fn wire(self) -> u16 {
        match self {
            CipherId::Aes256Gcm => 0,
            CipherId::ChaCha20Poly1305 => 1,
        }
    }

    pub fn from_wire(id: u16) -> Result<Self, MooncakeError> {
        match id {
            0 => Ok(CipherId::Aes256Gcm),
            1 => Ok(CipherId::ChaCha20Poly1305),
            other => Err(MooncakeError::UnsupportedCipher(other)),
        }
    }
}

/// Compression algorithm identifier as recorded in the compressed object
/// header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlgorithmId {
    None,
    Snappy,
    Lz4,
    Zstd,
}

impl AlgorithmId {
    pub fn wire(self) -> u8 {
        match self {
            AlgorithmId::None => 0,
            AlgorithmId::Snappy => 1,
            AlgorithmId::Lz4 => 2,
            AlgorithmId::Zstd => 3,
        }
    }

    pub fn from_wire(id: u8) -> Result<Self, MooncakeError> {
        match id {
            0 => Ok(AlgorithmId::None),
            1 => Ok(AlgorithmId::Snappy),
            2 => Ok(AlgorithmId::Lz4),
            3 => Ok(AlgorithmId::Zstd),
            other => Err(MooncakeError::UnknownAlgorithm(other)),
        }
    }
}
