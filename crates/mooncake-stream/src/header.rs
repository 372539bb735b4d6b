//! Header capture for streams that must be inspected before use
//!
//! `HeaderReader` forwards everything from the inner reader while keeping a
//! copy of the first `head_max` bytes. [`HeaderReader::peek`] fills that
//! copy ahead of time without advancing the caller's read position, which
//! lets format sniffing happen before the stream is consumed. Peek and read
//! must not be used concurrently.

use std::io::{self, Read};

pub struct HeaderReader<R> {
    inner: R,
    head_max: usize,
    header: Vec<u8>,
    /// Bytes of `header` already handed to the caller.
    served: usize,
    eof: bool,
}

impl<R: Read> HeaderReader<R> {
    pub fn new(inner: R, head_max: usize) -> Self {
        Self {
            inner,
            head_max,
            header: Vec::with_capacity(head_max),
            served: 0,
            eof: false,
        }
    }

    /// Fill and return the header buffer without advancing the caller's
    /// read position. Subsequent reads still deliver the peeked bytes.
    pub fn peek(&mut self) -> io::Result<&[u8]> {
        let mut scratch = [0u8; 4096];
        while self.header.len() < self.head_max && !self.eof {
            let want = (self.head_max - self.header.len()).min(scratch.len());
            let n = self.inner.read(&mut scratch[..want])?;
            if n == 0 {
                self.eof = true;
                break;
            }
            self.header.extend_from_slice(&scratch[..n]);
        }
        Ok(&self.header)
    }

    /// The captured stream prefix: up to `head_max` bytes, shorter only if
    /// the stream ended first.
    pub fn header(&self) -> &[u8] {
        &self.header
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for HeaderReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        // Deliver peeked-but-unserved bytes first.
        if self.served < self.header.len() {
            let rest = &self.header[self.served..];
            let n = rest.len().min(out.len());
            out[..n].copy_from_slice(&rest[..n]);
            self.served += n;
            return Ok(n);
        }

        let n = self.inner.read(out)?;
        if n == 0 {
            self.eof = true;
            return Ok(0);
        }

        // Capture into the header while it is not yet full.
        if self.header.len() < self.head_max {
            let take = (self.head_max - self.header.len()).min(n);
            self.header.extend_from_slice(&out[..take]);
            self.served = self.header.len();
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn dummy(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn check(read_buf: usize, stream_len: usize, head_max: usize, use_peek: bool) {
        let data = dummy(stream_len);
        let mut hr = HeaderReader::new(Cursor::new(data.clone()), head_max);

        let peeked = if use_peek {
            Some(hr.peek().unwrap().to_vec())
        } else {
            None
        };

        let mut out = Vec::new();
        let mut buf = vec![0u8; read_buf];
        loop {
            let n = hr.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(out, data, "forwarded stream must be unmodified");

        let expected_len = head_max.min(stream_len);
        assert_eq!(hr.header().len(), expected_len);
        assert_eq!(hr.header(), &data[..expected_len]);

        if let Some(peeked) = peeked {
            assert_eq!(peeked, hr.header(), "peek must match the final header");
        }
    }

    #[test]
    fn capture_grid() {
        let cases = [
            (256, 2048, 1024),
            (4096, 2048, 1024),
            (512, 2048, 4096),
            (512, 2048, 0),
            (123, 2048, 1024),
            (256, 1234, 1024),
            (123, 2048, 1234),
        ];
        for (read_buf, stream_len, head_max) in cases {
            check(read_buf, stream_len, head_max, false);
            check(read_buf, stream_len, head_max, true);
        }
    }

    #[test]
    fn peek_is_idempotent() {
        let data = dummy(100);
        let mut hr = HeaderReader::new(Cursor::new(data.clone()), 64);
        let first = hr.peek().unwrap().to_vec();
        let second = hr.peek().unwrap().to_vec();
        assert_eq!(first, second);
        assert_eq!(first, &data[..64]);
    }

    #[test]
    fn short_stream_truncates_header() {
        let mut hr = HeaderReader::new(Cursor::new(vec![7u8; 10]), 64);
        assert_eq!(hr.peek().unwrap().len(), 10);
    }
}
