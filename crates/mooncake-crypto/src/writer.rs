//! Encrypting writer
//!
//! Buffers plaintext until a full block is available and seals exactly one
//! frame per block. The header goes out on the first write (or on close,
//! for empty streams). Written byte counts acknowledge buffering, not
//! durability — callers must `close` to flush the final short frame.

use std::io::{self, Read, Write};

use mooncake_core::config::{DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE};
use mooncake_core::{CipherId, MooncakeError, MooncakeResult};

use crate::cipher::{block_nonce, AeadCipher};
use crate::header::Header;
use crate::keys::ObjectKey;

#[derive(Debug)]
pub struct EncryptWriter<W: Write> {
    sink: W,
    cipher: AeadCipher,
    header: [u8; crate::HEADER_SIZE],
    block_size: usize,
    /// Plaintext waiting for a full block.
    buf: Vec<u8>,
    /// Index of the next frame; also the nonce counter. Never rewinds.
    block_index: u64,
    header_written: bool,
    closed: bool,
}

impl<W: Write> EncryptWriter<W> {
    /// Writer with the default 64 KiB block size.
    pub fn new(sink: W, key: ObjectKey, cipher: CipherId) -> MooncakeResult<Self> {
        Self::with_block_size(sink, key, cipher, DEFAULT_BLOCK_SIZE)
    }

    pub fn with_block_size(
        sink: W,
        key: ObjectKey,
        cipher: CipherId,
        block_size: u32,
    ) -> MooncakeResult<Self> {
        if !(MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE).contains(&block_size) {
            return Err(MooncakeError::BadBlockSize(block_size));
        }

        let header = Header::new(cipher, &key, block_size).encode();
        let cipher = AeadCipher::new(cipher, &key);
        // `key` drops and zeroizes here; only the cipher state survives.

        Ok(Self {
            sink,
            cipher,
            header,
            block_size: block_size as usize,
            buf: Vec::new(),
            block_index: 0,
            header_written: false,
            closed: false,
        })
    }

    fn emit_header_if_needed(&mut self) -> MooncakeResult<()> {
        if self.header_written {
            return Ok(());
        }
        self.sink.write_all(&self.header)?;
        self.header_written = true;
        Ok(())
    }

    /// Seal and emit one frame from the front of the pending buffer.
    fn flush_block(&mut self) -> MooncakeResult<()> {
        let take = self.buf.len().min(self.block_size);
        let nonce = block_nonce(self.block_index);
        let sealed = self.cipher.seal(&nonce, &self.buf[..take])?;

        self.sink.write_all(&nonce)?;
        self.sink.write_all(&sealed)?;
        self.block_index += 1;
        self.buf.drain(..take);
        Ok(())
    }

    fn write_buffered(&mut self, data: &[u8]) -> MooncakeResult<usize> {
        if self.closed {
            return Err(MooncakeError::AlreadyClosed);
        }
        self.emit_header_if_needed()?;

        self.buf.extend_from_slice(data);
        while self.buf.len() >= self.block_size {
            self.flush_block()?;
        }
        // Acknowledge buffering; durability comes with close().
        Ok(data.len())
    }

    /// Bulk path: seal frames straight out of `source` without going
    /// through the internal buffer. Refuses to run while a partial block
    /// from `write` is pending, because that would shift every later frame
    /// off its alignment.
    pub fn encrypt_from<R: Read>(&mut self, source: &mut R) -> MooncakeResult<u64> {
        if self.closed {
            return Err(MooncakeError::AlreadyClosed);
        }
        if !self.buf.is_empty() {
            return Err(MooncakeError::MixedMethods);
        }
        self.emit_header_if_needed()?;

        let mut scratch = vec![0u8; self.block_size];
        let mut total = 0u64;
        loop {
            let n = read_full(source, &mut scratch)?;
            if n == 0 {
                break;
            }
            total += n as u64;

            let nonce = block_nonce(self.block_index);
            let sealed = self.cipher.seal(&nonce, &scratch[..n])?;
            self.sink.write_all(&nonce)?;
            self.sink.write_all(&sealed)?;
            self.block_index += 1;

            if n < self.block_size {
                // Source ended mid-block; that was the final short frame.
                break;
            }
        }
        Ok(total)
    }

    /// Emit the final short frame, if any, and flush the sink. Idempotent.
    pub fn close(&mut self) -> MooncakeResult<()> {
        if self.closed {
            return Ok(());
        }
        self.emit_header_if_needed()?;

        while !self.buf.is_empty() {
            self.flush_block()?;
        }
        self.sink.flush()?;
        self.closed = true;
        Ok(())
    }

    /// Close and hand back the sink.
    pub fn finish(mut self) -> MooncakeResult<W> {
        self.close()?;
        Ok(self.sink)
    }

    /// Frames emitted so far.
    pub fn blocks_written(&self) -> u64 {
        self.block_index
    }
}

impl<W: Write> Write for EncryptWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.write_buffered(data).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        // A partial block stays buffered until close; only the sink is
        // flushed here.
        self.sink.flush()
    }
}

/// Read until `buf` is full or the source is exhausted.
pub(crate) fn read_full<R: Read>(source: &mut R, buf: &mut [u8]) -> MooncakeResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = source.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
