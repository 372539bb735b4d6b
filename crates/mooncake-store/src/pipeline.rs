//! The composed object pipeline
//!
//! Writing: plaintext → [`ObjectWriter`] (compress, then encrypt) → blob
//! store. Reading: blob store → decrypt → decompress → caller, with seeks
//! delegating layer by layer.

use std::io::{self, Cursor, Read, Seek, Write};

use anyhow::{bail, Context, Result};
use tracing::debug;

use mooncake_compress::{ChunkReader, ChunkWriter};
use mooncake_core::{MooncakeResult, StreamConfig};
use mooncake_crypto::{header::MAGIC, DecryptReader, EncryptWriter, ObjectKey};
use mooncake_stream::{HeaderReader, SeekablePrefixReader};

use crate::catalog::{Catalog, FileEntry};
use crate::store::{BlobStore, ContentId, KeyProvider, ObjectSource};

/// Compressor over encryptor over `sink`. Bytes written here come out the
/// far end as a sealed object.
pub struct ObjectWriter<W: Write> {
    inner: ChunkWriter<EncryptWriter<W>>,
    plaintext_size: u64,
}

impl<W: Write> ObjectWriter<W> {
    pub fn new(sink: W, key: ObjectKey, config: StreamConfig) -> MooncakeResult<Self> {
        config.validate()?;
        let encryptor =
            EncryptWriter::with_block_size(sink, key, config.cipher, config.block_size)?;
        let compressor = ChunkWriter::new(encryptor, config.algorithm)?;
        Ok(Self {
            inner: compressor,
            plaintext_size: 0,
        })
    }

    /// Plaintext bytes accepted so far.
    pub fn plaintext_size(&self) -> u64 {
        self.plaintext_size
    }

    /// Finalize both layers and hand back the sink.
    pub fn finish(self) -> MooncakeResult<W> {
        let encryptor = self.inner.finish()?;
        encryptor.finish()
    }
}

impl<W: Write> Write for ObjectWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(data)?;
        self.plaintext_size += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Decompressor over decryptor: a seekable plaintext stream.
pub type ObjectReader<R> = ChunkReader<DecryptReader<R>>;

/// Stack the read layers over `source`.
pub fn open_object<R: Read + Seek>(source: R, key: ObjectKey) -> ObjectReader<R> {
    ChunkReader::new(DecryptReader::new(source, key))
}

/// Run `plaintext` through the write pipeline into the blob store and
/// record the chosen parameters for the read path.
pub fn store_stream(
    blobs: &dyn BlobStore,
    catalog: &mut dyn Catalog,
    keys: &dyn KeyProvider,
    path: &str,
    plaintext: &mut dyn Read,
    config: StreamConfig,
) -> Result<ContentId> {
    let key = keys.key_for(path)?;
    let mut writer = ObjectWriter::new(Vec::new(), key, config)?;
    io::copy(plaintext, &mut writer).context("piping plaintext into the object writer")?;

    let plaintext_size = writer.plaintext_size();
    let sealed = writer.finish()?;
    debug!(path, plaintext_size, sealed_size = sealed.len(), "sealed object");

    let id = blobs.put(&mut Cursor::new(sealed))?;
    catalog.record(
        path,
        FileEntry {
            content: id.clone(),
            config,
            plaintext_size,
        },
    )?;
    Ok(id)
}

/// Open a seekable plaintext stream for a cataloged file.
pub fn open_stream(
    blobs: &dyn BlobStore,
    catalog: &dyn Catalog,
    keys: &dyn KeyProvider,
    path: &str,
) -> Result<ObjectReader<SeekablePrefixReader<Box<dyn ObjectSource>>>> {
    let entry = catalog
        .lookup(path)?
        .with_context(|| format!("no catalog entry for {path}"))?;
    let key = keys.key_for(path)?;
    let source = blobs.open(&entry.content)?;

    // Sniff the magic before building the stack; the peeked bytes are put
    // back in band so the decryptor still sees the whole object.
    let mut sniffer = HeaderReader::new(source, MAGIC.len());
    let peeked = sniffer.peek().context("peeking stored object header")?;
    if peeked != MAGIC {
        bail!("object {} is not an encrypted stream", entry.content);
    }
    let prefix = peeked.to_vec();
    let source = SeekablePrefixReader::new(prefix, sniffer.into_inner());

    Ok(open_object(source, key))
}
