//! Decompressing reader with random access
//!
//! Opens a finished compressed object over any `Read + Seek` source. The
//! trailer and index are parsed lazily on first use; after that, reads
//! decode one chunk at a time into a [`ChunkBuffer`] and seeks are a
//! binary search over the index plus one chunk reload at most.
//!
//! Format and decode errors are sticky: once the object is known to be
//! corrupt, every further operation returns the same error.

use std::io::{self, Read, Seek, SeekFrom, Write};

use mooncake_core::{MooncakeError, MooncakeResult};
use mooncake_stream::ChunkBuffer;
use tracing::debug;

use crate::algo::{algorithm_for, Algorithm};
use crate::format::{Header, Record, Trailer, HEADER_SIZE, RECORD_SIZE, TRAILER_SIZE};

pub struct ChunkReader<R> {
    source: R,
    parsed: Option<Parsed>,
    sticky: Option<MooncakeError>,
    /// Currently decoded chunk.
    chunk: ChunkBuffer,
    /// Index position of the decoded chunk, if any.
    loaded: Option<usize>,
    /// Plaintext cursor.
    pos: u64,
}

struct Parsed {
    algo: Box<dyn Algorithm + Send>,
    index: Vec<Record>,
}

fn read_exact_or<R: Read>(source: &mut R, buf: &mut [u8], what: &'static str) -> MooncakeResult<()> {
    source.read_exact(buf).map_err(|err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            MooncakeError::Truncated(what)
        } else {
            MooncakeError::Io(err)
        }
    })
}

fn validate_index(index: &[Record]) -> MooncakeResult<()> {
    let first = index
        .first()
        .ok_or(MooncakeError::CorruptIndex("index is empty"))?;
    if first.raw_off != 0 || first.zip_off != 0 {
        return Err(MooncakeError::CorruptIndex("missing start sentinel"));
    }

    // The empty object is the one place the sentinels may coincide.
    if index.len() == 2 && index[1] == *first {
        return Ok(());
    }

    for pair in index.windows(2) {
        if pair[1].raw_off <= pair[0].raw_off || pair[1].zip_off <= pair[0].zip_off {
            return Err(MooncakeError::CorruptIndex("offsets not strictly increasing"));
        }
    }
    Ok(())
}

impl<R: Read + Seek> ChunkReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            parsed: None,
            sticky: None,
            chunk: ChunkBuffer::new(),
            loaded: None,
            pos: 0,
        }
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    fn ensure_parsed(&mut self) -> MooncakeResult<()> {
        if self.parsed.is_some() {
            return Ok(());
        }

        self.source.seek(SeekFrom::Start(0))?;
        let mut header_buf = [0u8; HEADER_SIZE];
        read_exact_or(&mut self.source, &mut header_buf, "missing header")?;
        let header = Header::decode(&header_buf)?;

        let end = self.source.seek(SeekFrom::End(0))?;
        let min_size = (HEADER_SIZE + 2 * RECORD_SIZE + TRAILER_SIZE) as u64;
        if end < min_size {
            return Err(MooncakeError::Truncated("object smaller than minimal layout"));
        }

        self.source.seek(SeekFrom::End(-(TRAILER_SIZE as i64)))?;
        let mut trailer_buf = [0u8; TRAILER_SIZE];
        read_exact_or(&mut self.source, &mut trailer_buf, "missing trailer")?;
        let trailer = Trailer::decode(&trailer_buf)?;

        let index_size = trailer.index_size;
        if index_size < 2 * RECORD_SIZE as u64
            || (HEADER_SIZE + TRAILER_SIZE) as u64 + index_size > end
        {
            return Err(MooncakeError::CorruptIndex("index does not fit the object"));
        }

        self.source
            .seek(SeekFrom::End(-((TRAILER_SIZE as u64 + index_size) as i64)))?;
        let mut index_buf = vec![0u8; index_size as usize];
        read_exact_or(&mut self.source, &mut index_buf, "missing index")?;

        let index: Vec<Record> = index_buf.chunks(RECORD_SIZE).map(Record::decode).collect();
        validate_index(&index)?;

        let body_size = end - (HEADER_SIZE + TRAILER_SIZE) as u64 - index_size;
        let last = index.last().expect("validated index is non-empty");
        if last.zip_off != body_size {
            return Err(MooncakeError::CorruptIndex("end sentinel does not match body size"));
        }

        debug!(
            algorithm = ?header.algorithm,
            records = index.len(),
            raw_size = last.raw_off,
            "parsed compressed object"
        );
        self.parsed = Some(Parsed {
            algo: algorithm_for(header.algorithm),
            index,
        });
        Ok(())
    }

    /// Position in the index of the chunk containing `pos`: the greatest
    /// record with `raw_off <= pos`.
    fn lookup(index: &[Record], pos: u64) -> usize {
        index.partition_point(|r| r.raw_off <= pos).saturating_sub(1)
    }

    /// Decode the chunk at index position `i` into the chunk buffer.
    /// Returns false when `i` has no chunk behind it (end of object).
    fn fill_chunk(&mut self, i: usize) -> MooncakeResult<bool> {
        let parsed = self.parsed.as_ref().expect("parsed before fill");
        if i + 1 >= parsed.index.len() {
            self.chunk.clear();
            self.loaded = None;
            return Ok(false);
        }
        let rec = parsed.index[i];
        let next = parsed.index[i + 1];
        let packed_size = (next.zip_off - rec.zip_off) as usize;
        if packed_size == 0 {
            self.chunk.clear();
            self.loaded = None;
            return Ok(false);
        }

        self.source
            .seek(SeekFrom::Start(HEADER_SIZE as u64 + rec.zip_off))?;
        let mut packed = vec![0u8; packed_size];
        read_exact_or(&mut self.source, &mut packed, "chunk body cut short")?;

        let decoded = parsed.algo.decode(&packed)?;
        if decoded.len() as u64 != next.raw_off - rec.raw_off {
            return Err(MooncakeError::CorruptIndex("chunk length does not match the index"));
        }
        self.chunk.load(decoded);
        self.loaded = Some(i);
        Ok(true)
    }

    fn read_inner(&mut self, out: &mut [u8]) -> MooncakeResult<usize> {
        self.ensure_parsed()?;
        if out.is_empty() {
            return Ok(0);
        }

        loop {
            if !self.chunk.is_empty() {
                let n = self.chunk.read(out).expect("chunk buffer reads cannot fail");
                self.pos += n as u64;
                return Ok(n);
            }

            let index = &self.parsed.as_ref().expect("parsed above").index;
            let i = Self::lookup(index, self.pos);
            let chunk_start = index[i].raw_off;
            if !self.fill_chunk(i)? {
                return Ok(0);
            }
            self.chunk.seek_to(self.pos - chunk_start);
        }
    }

    fn seek_inner(&mut self, whence: SeekFrom) -> MooncakeResult<u64> {
        self.ensure_parsed()?;
        let index = &self.parsed.as_ref().expect("parsed above").index;
        let total = index.last().expect("index is non-empty").raw_off;

        let target = match whence {
            SeekFrom::Start(off) => off as i128,
            SeekFrom::Current(off) => self.pos as i128 + off as i128,
            SeekFrom::End(off) => total as i128 + off as i128,
        };
        if target < 0 {
            return Err(MooncakeError::NegativeSeek);
        }
        let target = target as u64;

        // Stay on the buffered chunk when the target lands inside it; the
        // next read then needs no I/O at all.
        if let Some(i) = self.loaded {
            let start = index[i].raw_off;
            let end = start + self.chunk.chunk_len() as u64;
            if target >= start && target < end {
                self.chunk.seek_to(target - start);
            } else {
                self.chunk.clear();
                self.loaded = None;
            }
        }

        self.pos = target;
        Ok(target)
    }

    fn write_to_inner<W: Write + ?Sized>(&mut self, sink: &mut W) -> MooncakeResult<u64> {
        self.ensure_parsed()?;

        let mut written = self.chunk.write_to(sink)?;
        self.pos += written;

        loop {
            let index = &self.parsed.as_ref().expect("parsed above").index;
            let i = Self::lookup(index, self.pos);
            let chunk_start = index[i].raw_off;
            if !self.fill_chunk(i)? {
                break;
            }
            self.chunk.seek_to(self.pos - chunk_start);
            let n = self.chunk.write_to(sink)?;
            self.pos += n;
            written += n;
        }
        Ok(written)
    }

    /// Copy everything from the current position into `sink`, chunk by
    /// chunk, without going through an intermediate read buffer.
    pub fn write_to<W: Write + ?Sized>(&mut self, sink: &mut W) -> io::Result<u64> {
        if let Some(err) = &self.sticky {
            return Err(err.clone().into());
        }
        self.write_to_inner(sink).map_err(|err| self.note(err))
    }

    fn note(&mut self, err: MooncakeError) -> io::Error {
        if err.is_sticky() {
            self.sticky = Some(err.clone());
        }
        err.into()
    }
}

impl<R: Read + Seek> Read for ChunkReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if let Some(err) = &self.sticky {
            return Err(err.clone().into());
        }
        self.read_inner(out).map_err(|err| self.note(err))
    }
}

impl<R: Read + Seek> Seek for ChunkReader<R> {
    fn seek(&mut self, whence: SeekFrom) -> io::Result<u64> {
        if let Some(err) = &self.sticky {
            return Err(err.clone().into());
        }
        self.seek_inner(whence).map_err(|err| self.note(err))
    }
}
