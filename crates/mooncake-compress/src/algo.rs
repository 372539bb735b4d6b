//! Chunk codecs
//!
//! One [`Algorithm`] implementation per supported compression scheme. Each
//! stream instance owns its own boxed codec, selected at construction —
//! there is no process-wide registry.

use std::io;

use mooncake_core::{AlgorithmId, MooncakeError, MooncakeResult};

/// Encodes and decodes one chunk at a time.
pub trait Algorithm {
    fn encode(&self, chunk: &[u8]) -> MooncakeResult<Vec<u8>>;

    fn decode(&self, chunk: &[u8]) -> MooncakeResult<Vec<u8>>;

    /// Uncompressed bytes the writer gathers before encoding a chunk.
    fn chunk_size(&self) -> usize {
        64 * 1024
    }
}

/// Build the codec for `id`. Called once per stream instance.
pub fn algorithm_for(id: AlgorithmId) -> Box<dyn Algorithm + Send> {
    match id {
        AlgorithmId::None => Box::new(Passthrough),
        AlgorithmId::Snappy => Box::new(Snappy),
        AlgorithmId::Lz4 => Box::new(Lz4),
        AlgorithmId::Zstd => Box::new(Zstd),
    }
}

struct Passthrough;

impl Algorithm for Passthrough {
    fn encode(&self, chunk: &[u8]) -> MooncakeResult<Vec<u8>> {
        Ok(chunk.to_vec())
    }

    fn decode(&self, chunk: &[u8]) -> MooncakeResult<Vec<u8>> {
        Ok(chunk.to_vec())
    }
}

struct Snappy;

impl Algorithm for Snappy {
    fn encode(&self, chunk: &[u8]) -> MooncakeResult<Vec<u8>> {
        snap::raw::Encoder::new()
            .compress_vec(chunk)
            .map_err(|e| MooncakeError::Io(io::Error::other(e)))
    }

    fn decode(&self, chunk: &[u8]) -> MooncakeResult<Vec<u8>> {
        snap::raw::Decoder::new()
            .decompress_vec(chunk)
            .map_err(|e| MooncakeError::DecodeFailed(e.to_string()))
    }
}

struct Lz4;

impl Algorithm for Lz4 {
    fn encode(&self, chunk: &[u8]) -> MooncakeResult<Vec<u8>> {
        Ok(lz4_flex::compress_prepend_size(chunk))
    }

    fn decode(&self, chunk: &[u8]) -> MooncakeResult<Vec<u8>> {
        lz4_flex::decompress_size_prepended(chunk)
            .map_err(|e| MooncakeError::DecodeFailed(e.to_string()))
    }
}

struct Zstd;

impl Algorithm for Zstd {
    fn encode(&self, chunk: &[u8]) -> MooncakeResult<Vec<u8>> {
        zstd::encode_all(chunk, zstd::DEFAULT_COMPRESSION_LEVEL).map_err(MooncakeError::Io)
    }

    fn decode(&self, chunk: &[u8]) -> MooncakeResult<Vec<u8>> {
        zstd::decode_all(chunk).map_err(|e| MooncakeError::DecodeFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [AlgorithmId; 4] = [
        AlgorithmId::None,
        AlgorithmId::Snappy,
        AlgorithmId::Lz4,
        AlgorithmId::Zstd,
    ];

    #[test]
    fn every_codec_round_trips() {
        let data: Vec<u8> = (0u8..=255).cycle().take(70_000).collect();
        for id in ALL {
            let codec = algorithm_for(id);
            let packed = codec.encode(&data).unwrap();
            let back = codec.decode(&packed).unwrap();
            assert_eq!(back, data, "{id:?} must round-trip");
        }
    }

    #[test]
    fn empty_chunk_round_trips() {
        for id in ALL {
            let codec = algorithm_for(id);
            let packed = codec.encode(&[]).unwrap();
            assert!(codec.decode(&packed).unwrap().is_empty());
        }
    }

    #[test]
    fn repetitive_data_shrinks() {
        let data = vec![0x5Au8; 64 * 1024];
        for id in [AlgorithmId::Snappy, AlgorithmId::Lz4, AlgorithmId::Zstd] {
            let codec = algorithm_for(id);
            let packed = codec.encode(&data).unwrap();
            assert!(
                packed.len() < data.len() / 4,
                "{id:?} should compress repeated bytes well (got {})",
                packed.len()
            );
        }
    }

    #[test]
    fn garbage_fails_to_decode() {
        let garbage = vec![0xFFu8; 100];
        for id in [AlgorithmId::Snappy, AlgorithmId::Lz4, AlgorithmId::Zstd] {
            let codec = algorithm_for(id);
            let err = codec.decode(&garbage).unwrap_err();
            assert!(
                matches!(err, MooncakeError::DecodeFailed(_)),
                "{id:?} must report DecodeFailed, got {err:?}"
            );
        }
    }
}
