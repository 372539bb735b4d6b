//! Decrypting reader with random access
//!
//! Opens a finished encrypted object over any `Read + Seek` source. The
//! header is parsed on first use; after that the reader moves through the
//! states header-parsed → reading/seeking, and a failed tag check moves it
//! to poisoned for good: the poisoning error is re-delivered on every
//! further operation.
//!
//! A frame's position is a pure function of its index, so a seek is one
//! source seek plus one frame decode. The total plaintext size is computed
//! lazily for end-relative seeks by decoding the final frame — which also
//! authenticates the tail before its length is trusted.

use std::io::{self, Read, Seek, SeekFrom};

use mooncake_core::{MooncakeError, MooncakeResult};
use mooncake_stream::ChunkBuffer;
use tracing::debug;

use crate::cipher::AeadCipher;
use crate::header::Header;
use crate::keys::ObjectKey;
use crate::writer::read_full;
use crate::{HEADER_SIZE, NONCE_SIZE, TAG_SIZE};

pub struct DecryptReader<R> {
    source: R,
    /// Held until the header is parsed, then dropped.
    key: Option<ObjectKey>,
    parsed: Option<Parsed>,
    sticky: Option<MooncakeError>,
    /// Currently decoded frame.
    chunk: ChunkBuffer,
    /// Index of the decoded frame, if any.
    loaded: Option<u64>,
    /// Plaintext cursor.
    pos: u64,
    /// Lazily computed total plaintext size.
    total: Option<u64>,
}

struct Parsed {
    cipher: AeadCipher,
    block_size: usize,
}

impl<R: Read + Seek> DecryptReader<R> {
    pub fn new(source: R, key: ObjectKey) -> Self {
        Self {
            source,
            key: Some(key),
            parsed: None,
            sticky: None,
            chunk: ChunkBuffer::new(),
            loaded: None,
            pos: 0,
            total: None,
        }
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    fn ensure_header(&mut self) -> MooncakeResult<()> {
        if self.parsed.is_some() {
            return Ok(());
        }

        self.source.seek(SeekFrom::Start(0))?;
        let mut buf = [0u8; HEADER_SIZE];
        self.source.read_exact(&mut buf).map_err(|err| {
            if err.kind() == io::ErrorKind::UnexpectedEof {
                MooncakeError::Truncated("header cut short")
            } else {
                MooncakeError::Io(err)
            }
        })?;

        let header = Header::decode(&buf)?;
        let key = self.key.take().expect("key is present until the header parse");
        header.verify_key(&key)?;

        debug!(cipher = ?header.cipher, block_size = header.block_size, "parsed encrypted object header");
        self.parsed = Some(Parsed {
            cipher: AeadCipher::new(header.cipher, &key),
            block_size: header.block_size as usize,
        });
        Ok(())
    }

    fn block_size(&self) -> u64 {
        self.parsed.as_ref().expect("header parsed first").block_size as u64
    }

    /// Position the source at frame `index`, decode it into the chunk
    /// buffer, and verify its tag. Returns false at end of stream.
    fn load_frame(&mut self, index: u64) -> MooncakeResult<bool> {
        let parsed = self.parsed.as_ref().expect("header parsed first");
        let frame_size = (NONCE_SIZE + parsed.block_size + TAG_SIZE) as u64;
        self.source
            .seek(SeekFrom::Start(HEADER_SIZE as u64 + index * frame_size))?;

        let mut nonce = [0u8; NONCE_SIZE];
        let got = read_full(&mut self.source, &mut nonce)?;
        if got == 0 {
            self.chunk.clear();
            self.loaded = None;
            return Ok(false);
        }
        if got < NONCE_SIZE {
            return Err(MooncakeError::Truncated("frame nonce cut short"));
        }

        let mut body = vec![0u8; parsed.block_size + TAG_SIZE];
        let got = read_full(&mut self.source, &mut body)?;
        if got < TAG_SIZE {
            return Err(MooncakeError::Truncated("frame body cut short"));
        }

        // The nonce comes off the wire: a flipped bit in either nonce or
        // body fails the tag check.
        let plain = parsed.cipher.open(index, &nonce, &body[..got])?;
        self.chunk.load(plain);
        self.loaded = Some(index);
        Ok(true)
    }

    fn read_inner(&mut self, out: &mut [u8]) -> MooncakeResult<usize> {
        self.ensure_header()?;
        if out.is_empty() {
            return Ok(0);
        }

        loop {
            if !self.chunk.is_empty() {
                let n = self.chunk.read(out).expect("chunk buffer reads cannot fail");
                self.pos += n as u64;
                return Ok(n);
            }

            let block_size = self.block_size();
            let index = self.pos / block_size;
            if self.loaded == Some(index) {
                // The frame is decoded and holds nothing at or past pos;
                // only the final short frame can end this way.
                return Ok(0);
            }
            if !self.load_frame(index)? {
                return Ok(0);
            }
            self.chunk.seek_to(self.pos - index * block_size);
            if self.chunk.is_empty() {
                return Ok(0);
            }
        }
    }

    fn seek_inner(&mut self, whence: SeekFrom) -> MooncakeResult<u64> {
        self.ensure_header()?;

        let target = match whence {
            SeekFrom::Start(off) => off as i128,
            SeekFrom::Current(off) => self.pos as i128 + off as i128,
            SeekFrom::End(off) => self.size_inner()? as i128 + off as i128,
        };
        if target < 0 {
            return Err(MooncakeError::NegativeSeek);
        }
        let target = target as u64;

        let block_size = self.block_size();
        let index = target / block_size;
        if self.loaded == Some(index) {
            self.chunk.seek_to(target - index * block_size);
        } else if self.load_frame(index)? {
            self.chunk.seek_to(target - index * block_size);
        }
        // Past the end: the chunk is cleared and the next read reports EOF.

        self.pos = target;
        Ok(target)
    }

    /// Total plaintext size, derived from the residual ciphertext length
    /// and one decode of the final frame. Cached after the first call.
    fn size_inner(&mut self) -> MooncakeResult<u64> {
        if let Some(total) = self.total {
            return Ok(total);
        }
        self.ensure_header()?;

        let block_size = self.block_size();
        let frame_size = NONCE_SIZE as u64 + block_size + TAG_SIZE as u64;
        let end = self.source.seek(SeekFrom::End(0))?;
        if end < HEADER_SIZE as u64 {
            return Err(MooncakeError::Truncated("header cut short"));
        }

        let body = end - HEADER_SIZE as u64;
        let total = if body == 0 {
            0
        } else {
            let full_frames = body / frame_size;
            let residual = body % frame_size;
            let last_index = if residual == 0 {
                full_frames - 1
            } else {
                if residual <= (NONCE_SIZE + TAG_SIZE) as u64 {
                    return Err(MooncakeError::Truncated("frame tail too small"));
                }
                full_frames
            };

            if !self.load_frame(last_index)? {
                return Err(MooncakeError::Truncated("final frame missing"));
            }
            let tail_len = self.chunk.chunk_len() as u64;

            // Put the chunk state back in line with the caller's cursor.
            if self.loaded == Some(self.pos / block_size) {
                self.chunk.seek_to(self.pos - (self.pos / block_size) * block_size);
            } else {
                self.chunk.clear();
                self.loaded = None;
            }

            last_index * block_size + tail_len
        };

        self.total = Some(total);
        Ok(total)
    }

    fn note(&mut self, err: MooncakeError) -> io::Error {
        if err.is_sticky() {
            self.sticky = Some(err.clone());
        }
        err.into()
    }
}

impl<R: Read + Seek> Read for DecryptReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if let Some(err) = &self.sticky {
            return Err(err.clone().into());
        }
        self.read_inner(out).map_err(|err| self.note(err))
    }
}

impl<R: Read + Seek> Seek for DecryptReader<R> {
    fn seek(&mut self, whence: SeekFrom) -> io::Result<u64> {
        if let Some(err) = &self.sticky {
            return Err(err.clone().into());
        }
        self.seek_inner(whence).map_err(|err| self.note(err))
    }
}
