//! Prefix readers
//!
//! [`PrefixReader`] is a plain concatenation: the prefix bytes come first,
//! then everything the inner reader produces.
//!
//! [`SeekablePrefixReader`] exists for streams that were peeked at: the
//! prefix is the already-consumed start of the inner stream, held in a
//! buffer so sequential readers do not miss it. The combined stream's
//! length is the inner stream's length, and any seek abandons the buffered
//! prefix and resolves against the inner stream alone.

use std::io::{self, Read, Seek, SeekFrom};

pub struct PrefixReader<R> {
    prefix: Vec<u8>,
    pos: usize,
    tail: R,
}

impl<R: Read> PrefixReader<R> {
    pub fn new(prefix: Vec<u8>, tail: R) -> Self {
        Self {
            prefix,
            pos: 0,
            tail,
        }
    }
}

impl<R: Read> Read for PrefixReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.pos < self.prefix.len() {
            let rest = &self.prefix[self.pos..];
            let n = rest.len().min(out.len());
            out[..n].copy_from_slice(&rest[..n]);
            self.pos += n;
            return Ok(n);
        }
        self.tail.read(out)
    }
}

/// A peeked stream re-assembled into a seekable whole.
///
/// The inner stream must be positioned just past the prefix; the prefix
/// bytes are assumed to be present at its start.
pub struct SeekablePrefixReader<R> {
    prefix: Vec<u8>,
    pos: usize,
    /// False once a seek bypassed the prefix buffer.
    serving_prefix: bool,
    inner: R,
}

impl<R: Read + Seek> SeekablePrefixReader<R> {
    pub fn new(prefix: Vec<u8>, inner: R) -> Self {
        let serving_prefix = !prefix.is_empty();
        Self {
            prefix,
            pos: 0,
            serving_prefix,
            inner,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> Read for SeekablePrefixReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.serving_prefix && self.pos < self.prefix.len() {
            let rest = &self.prefix[self.pos..];
            let n = rest.len().min(out.len());
            out[..n].copy_from_slice(&rest[..n]);
            self.pos += n;
            return Ok(n);
        }
        self.inner.read(out)
    }
}

impl<R: Read + Seek> Seek for SeekablePrefixReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        // Relative seeks resolve against the logical position, which is the
        // prefix cursor while the prefix is still being served.
        let resolved = match pos {
            SeekFrom::Current(off) if self.serving_prefix => {
                let target = self.pos as i64 + off;
                if target < 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "seek to negative offset",
                    ));
                }
                self.inner.seek(SeekFrom::Start(target as u64))?
            }
            other => self.inner.seek(other)?,
        };
        self.serving_prefix = false;
        Ok(resolved)
    }
}
