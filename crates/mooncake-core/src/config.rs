use serde::{Deserialize, Serialize};

use crate::error::{MooncakeError, MooncakeResult};
use crate::types::{AlgorithmId, CipherId};

/// Smallest plaintext block size a writer accepts (4 KiB).
pub const MIN_BLOCK_SIZE: u32 = 4 * 1024;

/// Largest plaintext block size a writer accepts (1 MiB).
pub const MAX_BLOCK_SIZE: u32 = 1024 * 1024;

/// Default plaintext block size (64 KiB). Also the compressor's chunk
/// target, so one compressed chunk maps onto one encrypted block.
pub const DEFAULT_BLOCK_SIZE: u32 = 64 * 1024;

/// Encoding parameters chosen when a stream is written.
///
/// The catalog stores these per logical file so the read path can rebuild
/// the exact same pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub cipher: CipherId,
    pub algorithm: AlgorithmId,
    /// Plaintext bytes per encrypted block.
    pub block_size: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            cipher: CipherId::ChaCha20Poly1305,
            algorithm: AlgorithmId::Zstd,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl StreamConfig {
    /// Reject block sizes outside `[MIN_BLOCK_SIZE, MAX_BLOCK_SIZE]`.
    pub fn validate(&self) -> MooncakeResult<()> {
        if self.block_size < MIN_BLOCK_SIZE || self.block_size > MAX_BLOCK_SIZE {
            return Err(MooncakeError::BadBlockSize(self.block_size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        StreamConfig::default().validate().unwrap();
    }

    #[test]
    fn block_size_bounds() {
        let mut config = StreamConfig::default();

        config.block_size = MIN_BLOCK_SIZE;
        config.validate().unwrap();
        config.block_size = MAX_BLOCK_SIZE;
        config.validate().unwrap();

        config.block_size = MIN_BLOCK_SIZE - 1;
        assert!(matches!(
            config.validate().unwrap_err(),
            MooncakeError::BadBlockSize(_)
        ));
        config.block_size = MAX_BLOCK_SIZE + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_serde_round_trip() {
        let config = StreamConfig {
            cipher: CipherId::Aes256Gcm,
            algorithm: AlgorithmId::Snappy,
            block_size: 8192,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: StreamConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: StreamConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StreamConfig::default());
    }
}
