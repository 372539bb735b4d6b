//! Fixed-capacity seekable buffer for one decoded chunk
//!
//! Decoders materialize one chunk (or block) at a time into a
//! `ChunkBuffer` and serve reads from it. Loading a new chunk hands the
//! decoded bytes over by value, so the buffer never grows past one chunk
//! and no copy is made on refill.

use std::io::{self, Read, Seek, SeekFrom, Write};

#[derive(Debug, Default)]
pub struct ChunkBuffer {
    buf: Vec<u8>,
    read_off: usize,
}

impl ChunkBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the buffer contents, taking ownership of `data`.
    /// The read cursor moves back to the start.
    pub fn load(&mut self, data: Vec<u8>) {
        self.buf = data;
        self.read_off = 0;
    }

    /// Drop the contents; subsequent reads return EOF until `load`.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.read_off = 0;
    }

    /// Unread bytes remaining in the buffer.
    pub fn len(&self) -> usize {
        self.buf.len() - self.read_off
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total size of the loaded chunk, read or not.
    pub fn chunk_len(&self) -> usize {
        self.buf.len()
    }

    /// Read cursor position within the chunk.
    pub fn position(&self) -> u64 {
        self.read_off as u64
    }

    /// Move the read cursor to `off`, clamped to the chunk length.
    pub fn seek_to(&mut self, off: u64) {
        self.read_off = (off as usize).min(self.buf.len());
    }

    /// Write the unread remainder straight into `w`.
    pub fn write_to<W: Write + ?Sized>(&mut self, w: &mut W) -> io::Result<u64> {
        let rest = &self.buf[self.read_off..];
        w.write_all(rest)?;
        let n = rest.len();
        self.read_off = self.buf.len();
        Ok(n as u64)
    }
}

impl Read for ChunkBuffer {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let rest = &self.buf[self.read_off..];
        let n = rest.len().min(out.len());
        out[..n].copy_from_slice(&rest[..n]);
        self.read_off += n;
        Ok(n)
    }
}

impl Seek for ChunkBuffer {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(off) => off as i64,
            SeekFrom::Current(off) => self.read_off as i64 + off,
            SeekFrom::End(off) => self.buf.len() as i64 + off,
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek to negative offset",
            ));
        }
        self.seek_to(target as u64);
        Ok(self.read_off as u64)
    }
}
