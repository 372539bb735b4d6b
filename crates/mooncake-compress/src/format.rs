//! Wire format of the compressed object: header, index record, trailer

use mooncake_core::{AlgorithmId, MooncakeError, MooncakeResult};

pub const MAGIC: &[u8; 4] = b"cz01";
pub const TRAILER_MAGIC: &[u8; 8] = b"cztrail1";

pub const HEADER_SIZE: usize = 12;
pub const RECORD_SIZE: usize = 16;
pub const TRAILER_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub algorithm: AlgorithmId,
    pub flags: u8,
}

impl Header {
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[..4].copy_from_slice(MAGIC);
        buf[4] = self.algorithm.wire();
        buf[5] = self.flags;
        // bytes 6..12 reserved, zero
        buf
    }

    pub fn decode(buf: &[u8; HEADER_SIZE]) -> MooncakeResult<Self> {
        if &buf[..4] != MAGIC {
            return Err(MooncakeError::BadMagic { expected: "cz01" });
        }
        Ok(Self {
            algorithm: AlgorithmId::from_wire(buf[4])?,
            flags: buf[5],
        })
    }
}

/// One index entry: a chunk's starting offsets in the uncompressed stream
/// (`raw_off`) and in the compressed body (`zip_off`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub raw_off: u64,
    pub zip_off: u64,
}

impl Record {
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        buf[..8].copy_from_slice(&self.raw_off.to_be_bytes());
        buf[8..].copy_from_slice(&self.zip_off.to_be_bytes());
        buf
    }

    pub fn decode(buf: &[u8]) -> Self {
        Self {
            raw_off: u64::from_be_bytes(buf[..8].try_into().expect("record is 16 bytes")),
            zip_off: u64::from_be_bytes(buf[8..16].try_into().expect("record is 16 bytes")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
    /// Size of the index in bytes; always a multiple of [`RECORD_SIZE`].
    pub index_size: u64,
}

impl Trailer {
    pub fn encode(&self) -> [u8; TRAILER_SIZE] {
        let mut buf = [0u8; TRAILER_SIZE];
        buf[..8].copy_from_slice(&self.index_size.to_be_bytes());
        buf[8..].copy_from_slice(TRAILER_MAGIC);
        buf
    }

    pub fn decode(buf: &[u8; TRAILER_SIZE]) -> MooncakeResult<Self> {
        if &buf[8..] != TRAILER_MAGIC {
            return Err(MooncakeError::CorruptTrailer("bad trailer magic"));
        }
        let index_size = u64::from_be_bytes(buf[..8].try_into().expect("trailer is 16 bytes"));
        if index_size == 0 || index_size % RECORD_SIZE as u64 != 0 {
            return Err(MooncakeError::CorruptTrailer(
                "index size not a multiple of the record size",
            ));
        }
        Ok(Self { index_size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip() {
        let header = Header {
            algorithm: AlgorithmId::Lz4,
            flags: 0,
        };
        let buf = header.encode();
        assert_eq!(&buf[..4], b"cz01");
        assert_eq!(buf[4], 2);
        assert_eq!(&buf[6..], &[0u8; 6]);
        assert_eq!(Header::decode(&buf).unwrap(), header);
    }

    #[test]
    fn header_rejects_bad_magic() {
        let mut buf = Header {
            algorithm: AlgorithmId::None,
            flags: 0,
        }
        .encode();
        buf[0] ^= 0xFF;
        assert!(matches!(
            Header::decode(&buf).unwrap_err(),
            MooncakeError::BadMagic { .. }
        ));
    }

    #[test]
    fn record_layout_is_big_endian() {
        let rec = Record {
            raw_off: 0x0102030405060708,
            zip_off: 0x1112131415161718,
        };
        let buf = rec.encode();
        assert_eq!(buf[0], 0x01);
        assert_eq!(buf[7], 0x08);
        assert_eq!(buf[8], 0x11);
        assert_eq!(Record::decode(&buf), rec);
    }

    #[test]
    fn trailer_round_trip_and_validation() {
        let trailer = Trailer { index_size: 48 };
        let buf = trailer.encode();
        assert_eq!(&buf[8..], b"cztrail1");
        assert_eq!(Trailer::decode(&buf).unwrap(), trailer);

        let mut bad = buf;
        bad[15] ^= 1;
        assert!(matches!(
            Trailer::decode(&bad).unwrap_err(),
            MooncakeError::CorruptTrailer(_)
        ));

        let odd = Trailer { index_size: 17 }.encode();
        assert!(Trailer::decode(&odd).is_err());
    }
}
