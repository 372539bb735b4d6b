//! Byte counting for pipelines that need to know how much went through
//!
//! `SizeAccumulator` passes nothing along — it is meant to sit behind a
//! tee or be written to directly — and only counts. The counter is atomic,
//! so one accumulator may be shared by parallel writers.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct SizeAccumulator {
    size: AtomicU64,
}

impl SizeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total bytes observed so far.
    pub fn size(&self) -> u64 {
        self.size.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.size.store(0, Ordering::Relaxed);
    }

    pub fn add(&self, n: u64) {
        self.size.fetch_add(n, Ordering::Relaxed);
    }
}

impl Write for &SizeAccumulator {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.add(buf.len() as u64);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Write for SizeAccumulator {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.add(buf.len() as u64);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
