//! Random-access behavior over large compressed objects

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use mooncake_compress::{ChunkReader, ChunkWriter, RECORD_SIZE, TRAILER_SIZE};
use mooncake_core::AlgorithmId;
use proptest::prelude::*;

fn compress(data: &[u8], algo: AlgorithmId) -> Vec<u8> {
    let mut w = ChunkWriter::new(Vec::new(), algo).unwrap();
    w.write_all(data).unwrap();
    w.finish().unwrap()
}

fn read_n<R: Read>(r: &mut R, n: usize) -> Vec<u8> {
    let mut out = vec![0u8; n];
    let mut filled = 0;
    while filled < n {
        let got = r.read(&mut out[filled..]).unwrap();
        if got == 0 {
            break;
        }
        filled += got;
    }
    out.truncate(filled);
    out
}

#[test]
fn ten_mebibyte_seek() {
    let data = vec![0x5Au8; 10 * 1024 * 1024];
    let object = compress(&data, AlgorithmId::Snappy);

    let mut r = ChunkReader::new(Cursor::new(&object));
    r.seek(SeekFrom::Start(5_000_000)).unwrap();
    let got = read_n(&mut r, 1000);
    assert_eq!(got, vec![0x5Au8; 1000]);

    // Trailer: index size must be whole records, and one record per chunk
    // plus the end sentinel.
    let trailer_start = object.len() - TRAILER_SIZE;
    let index_size =
        u64::from_be_bytes(object[trailer_start..trailer_start + 8].try_into().unwrap());
    assert_eq!(index_size % RECORD_SIZE as u64, 0);

    let min_records = (data.len() as u64).div_ceil(64 * 1024);
    assert!(
        index_size / RECORD_SIZE as u64 >= min_records,
        "index must cover every chunk"
    );
}

#[test]
fn size_matches_for_every_algorithm() {
    let data: Vec<u8> = (0..777_777).map(|i| (i % 251) as u8).collect();
    for algo in [
        AlgorithmId::None,
        AlgorithmId::Snappy,
        AlgorithmId::Lz4,
        AlgorithmId::Zstd,
    ] {
        let object = compress(&data, algo);
        let mut r = ChunkReader::new(Cursor::new(object));
        assert_eq!(
            r.seek(SeekFrom::End(0)).unwrap(),
            data.len() as u64,
            "{algo:?} size must match"
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn compress_read_round_trip(
        data in proptest::collection::vec(any::<u8>(), 0..=200_000),
        algo in prop_oneof![
            Just(AlgorithmId::None),
            Just(AlgorithmId::Snappy),
            Just(AlgorithmId::Lz4),
            Just(AlgorithmId::Zstd),
        ],
    ) {
        let object = compress(&data, algo);
        let mut r = ChunkReader::new(Cursor::new(object));
        let mut out = Vec::new();
        r.read_to_end(&mut out).unwrap();
        prop_assert_eq!(out, data);
    }

    #[test]
    fn seek_then_read_matches_slice(
        data in proptest::collection::vec(any::<u8>(), 1..=200_000),
        offsets in proptest::collection::vec(any::<prop::sample::Index>(), 1..8),
        len in 1usize..4096,
    ) {
        let object = compress(&data, AlgorithmId::Lz4);
        let mut r = ChunkReader::new(Cursor::new(object));

        for idx in offsets {
            let off = idx.index(data.len());
            r.seek(SeekFrom::Start(off as u64)).unwrap();
            let got = read_n(&mut r, len);
            let end = (off + len).min(data.len());
            prop_assert_eq!(&got[..], &data[off..end], "slice mismatch at {}", off);
        }
    }
}
