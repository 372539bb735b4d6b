//! Write-side byte limit
//!
//! Forwards at most `limit` bytes to the inner writer. Everything past the
//! limit is dropped, but the caller is always told the full buffer was
//! consumed so upstream copies do not stall.

use std::io::{self, Write};

pub struct LimitWriter<W> {
    inner: W,
    remaining: u64,
}

impl<W: Write> LimitWriter<W> {
    pub fn new(inner: W, limit: u64) -> Self {
        Self {
            inner,
            remaining: limit,
        }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for LimitWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let take = (buf.len() as u64).min(self.remaining) as usize;
        if take > 0 {
            self.inner.write_all(&buf[..take])?;
            self.remaining -= take as u64;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_forwarded_bytes() {
        // (limit, write size, writes)
        let cases = [
            (1024, 512, 3),
            (1024, 512, 2),
            (1022, 511, 2),
            (1023, 1024, 1),
            (1024, 1025, 1),
        ];

        for (limit, write_size, writes) in cases {
            let mut w = LimitWriter::new(Vec::new(), limit);
            let chunk: Vec<u8> = (0..write_size).map(|i| (i % 256) as u8).collect();

            let mut expected = Vec::new();
            for _ in 0..writes {
                let n = w.write(&chunk).unwrap();
                assert_eq!(n, chunk.len(), "caller always sees full consumption");
                expected.extend_from_slice(&chunk);
            }
            expected.truncate(limit as usize);

            let out = w.into_inner();
            assert_eq!(out.len() as u64, limit.min(write_size * writes as u64));
            assert_eq!(out, expected[..out.len()]);
        }
    }

    #[test]
    fn zero_limit_drops_everything() {
        let mut w = LimitWriter::new(Vec::new(), 0);
        assert_eq!(w.write(b"dropped").unwrap(), 7);
        assert!(w.into_inner().is_empty());
    }
}
