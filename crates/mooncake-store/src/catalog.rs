//! Per-file stream metadata
//!
//! The catalog records, for every logical file, which sealed object holds
//! its content and the parameters the write path chose. The read path
//! needs all of it to rebuild the exact same stack.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use mooncake_core::StreamConfig;

use crate::store::ContentId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// The sealed object backing this file.
    pub content: ContentId,
    /// Cipher, compression algorithm, and block size used at write time.
    pub config: StreamConfig,
    /// Plaintext size in bytes.
    pub plaintext_size: u64,
}

impl FileEntry {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| anyhow::anyhow!("catalog entry serialization: {e}"))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data)
            .map_err(|e| anyhow::anyhow!("catalog entry deserialization: {e}"))
    }
}

pub trait Catalog {
    fn record(&mut self, path: &str, entry: FileEntry) -> Result<()>;

    fn lookup(&self, path: &str) -> Result<Option<FileEntry>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mooncake_core::{AlgorithmId, CipherId};

    #[test]
    fn entry_round_trips_through_bytes() {
        let entry = FileEntry {
            content: ContentId("b3-0011aabb".into()),
            config: StreamConfig {
                cipher: CipherId::Aes256Gcm,
                algorithm: AlgorithmId::Lz4,
                block_size: 8192,
            },
            plaintext_size: 123_456,
        };

        let bytes = entry.to_bytes().unwrap();
        assert_eq!(FileEntry::from_bytes(&bytes).unwrap(), entry);
    }

    #[test]
    fn garbage_entry_is_rejected() {
        assert!(FileEntry::from_bytes(b"not json at all").is_err());
    }
}
