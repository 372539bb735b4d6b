//! Chunked compression writer
//!
//! Accepts arbitrary-length writes, cuts them into chunks, and emits each
//! chunk through the configured codec. An index record marking the chunk's
//! offsets is taken *before* the chunk is written, so records always point
//! at chunk starts; `close` appends the end sentinel, the index, and the
//! trailer.

use std::io::{self, Write};

use mooncake_core::{AlgorithmId, MooncakeError, MooncakeResult};
use mooncake_stream::SizeAccumulator;

use crate::algo::{algorithm_for, Algorithm};
use crate::format::{Header, Record, Trailer};

pub struct ChunkWriter<W: Write> {
    sink: W,
    algo: Box<dyn Algorithm + Send>,
    /// Plaintext waiting for a full chunk.
    buf: Vec<u8>,
    index: Vec<Record>,
    raw_off: u64,
    /// Compressed body bytes written so far; the next chunk's zip_off.
    body_size: SizeAccumulator,
    closed: bool,
}

impl<W: Write> ChunkWriter<W> {
    /// Create a writer over `sink`. The 12-byte header is emitted
    /// immediately.
    pub fn new(mut sink: W, algorithm: AlgorithmId) -> MooncakeResult<Self> {
        let header = Header {
            algorithm,
            flags: 0,
        };
        sink.write_all(&header.encode())?;

        Ok(Self {
            sink,
            algo: algorithm_for(algorithm),
            buf: Vec::new(),
            index: Vec::new(),
            raw_off: 0,
            body_size: SizeAccumulator::new(),
            closed: false,
        })
    }

    /// Compress and emit one chunk from the front of the pending buffer.
    fn flush_chunk(&mut self) -> MooncakeResult<()> {
        let take = self.buf.len().min(self.algo.chunk_size());
        self.index.push(Record {
            raw_off: self.raw_off,
            zip_off: self.body_size.size(),
        });

        let packed = self.algo.encode(&self.buf[..take])?;
        self.sink.write_all(&packed)?;
        self.body_size.add(packed.len() as u64);
        self.raw_off += take as u64;
        self.buf.drain(..take);
        Ok(())
    }

    fn write_buffered(&mut self, data: &[u8]) -> MooncakeResult<usize> {
        if self.closed {
            return Err(MooncakeError::AlreadyClosed);
        }
        self.buf.extend_from_slice(data);
        while self.buf.len() >= self.algo.chunk_size() {
            self.flush_chunk()?;
        }
        Ok(data.len())
    }

    /// Flush any pending partial chunk and emit end sentinel, index, and
    /// trailer. Idempotent; the writer accepts no further writes.
    pub fn close(&mut self) -> MooncakeResult<()> {
        if self.closed {
            return Ok(());
        }

        while !self.buf.is_empty() {
            self.flush_chunk()?;
        }

        // Even an empty object carries both sentinels.
        if self.index.is_empty() {
            self.index.push(Record {
                raw_off: 0,
                zip_off: 0,
            });
        }
        self.index.push(Record {
            raw_off: self.raw_off,
            zip_off: self.body_size.size(),
        });

        for record in &self.index {
            self.sink.write_all(&record.encode())?;
        }
        let index_size = (self.index.len() * crate::format::RECORD_SIZE) as u64;
        self.sink.write_all(&Trailer { index_size }.encode())?;
        self.sink.flush()?;
        self.closed = true;
        Ok(())
    }

    /// Close and hand back the sink.
    pub fn finish(mut self) -> MooncakeResult<W> {
        self.close()?;
        Ok(self.sink)
    }

    /// Total uncompressed bytes flushed into chunks so far.
    pub fn raw_size(&self) -> u64 {
        self.raw_off
    }
}

impl<W: Write> Write for ChunkWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.write_buffered(data).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        // Partial chunks stay buffered until close; only the sink is
        // flushed here.
        self.sink.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{HEADER_SIZE, RECORD_SIZE, TRAILER_SIZE};

    fn parse_index(object: &[u8]) -> Vec<Record> {
        let trailer_start = object.len() - TRAILER_SIZE;
        let mut trailer_buf = [0u8; TRAILER_SIZE];
        trailer_buf.copy_from_slice(&object[trailer_start..]);
        let trailer = Trailer::decode(&trailer_buf).unwrap();

        let index_start = trailer_start - trailer.index_size as usize;
        object[index_start..trailer_start]
            .chunks(RECORD_SIZE)
            .map(Record::decode)
            .collect()
    }

    #[test]
    fn header_is_emitted_immediately() {
        let w = ChunkWriter::new(Vec::new(), AlgorithmId::Snappy).unwrap();
        let out = w.finish().unwrap();
        assert_eq!(&out[..4], b"cz01");
        assert_eq!(out[4], 1);
    }

    #[test]
    fn empty_object_has_both_sentinels() {
        let w = ChunkWriter::new(Vec::new(), AlgorithmId::None).unwrap();
        let out = w.finish().unwrap();
        assert_eq!(out.len(), HEADER_SIZE + 2 * RECORD_SIZE + TRAILER_SIZE);

        let index = parse_index(&out);
        assert_eq!(index.len(), 2, "empty object still carries start and end sentinel");
        assert_eq!(index[0], Record { raw_off: 0, zip_off: 0 });
        assert_eq!(index[1], Record { raw_off: 0, zip_off: 0 });
    }

    #[test]
    fn index_is_strictly_monotonic() {
        let mut w = ChunkWriter::new(Vec::new(), AlgorithmId::Lz4).unwrap();
        let data: Vec<u8> = (0u8..=255).cycle().take(300_000).collect();
        w.write_all(&data).unwrap();
        let out = w.finish().unwrap();

        let index = parse_index(&out);
        assert!(index.len() >= 2);
        assert_eq!(index[0], Record { raw_off: 0, zip_off: 0 });
        assert_eq!(index.last().unwrap().raw_off, data.len() as u64);
        for pair in index.windows(2) {
            assert!(pair[1].raw_off > pair[0].raw_off, "raw offsets must increase");
            assert!(pair[1].zip_off > pair[0].zip_off, "zip offsets must increase");
        }
    }

    #[test]
    fn chunk_count_matches_input_size() {
        let mut w = ChunkWriter::new(Vec::new(), AlgorithmId::Snappy).unwrap();
        let data = vec![0x5Au8; 200_000];
        w.write_all(&data).unwrap();
        let out = w.finish().unwrap();

        let index = parse_index(&out);
        // ceil(200000 / 65536) chunks plus the end sentinel
        assert_eq!(index.len(), 4 + 1);
    }

    #[test]
    fn close_is_idempotent() {
        let mut w = ChunkWriter::new(Vec::new(), AlgorithmId::None).unwrap();
        w.write_all(b"some data").unwrap();
        w.close().unwrap();
        w.close().unwrap();
    }

    #[test]
    fn write_after_close_is_rejected() {
        let mut w = ChunkWriter::new(Vec::new(), AlgorithmId::None).unwrap();
        w.close().unwrap();
        let err = w.write(b"late").unwrap_err();
        let typed = mooncake_core::stream_error(&err).unwrap();
        assert!(matches!(typed, MooncakeError::AlreadyClosed));
    }

    #[test]
    fn flush_does_not_cut_a_chunk() {
        let mut w = ChunkWriter::new(Vec::new(), AlgorithmId::None).unwrap();
        w.write_all(b"partial").unwrap();
        w.flush().unwrap();
        assert_eq!(w.raw_size(), 0, "partial chunks stay buffered until close");
        w.close().unwrap();
        assert_eq!(w.raw_size(), 7);
    }
}
