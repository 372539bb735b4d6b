//! mooncake-store: pipeline composition over a content-addressed backend
//!
//! Ingest nests the write layers as compressor → encryptor → blob store;
//! retrieval nests the read layers as decryptor → decompressor. Every
//! layer exposes the same minimal stream contract, so the composite is
//! itself a seekable plaintext stream: a seek on the decompressor resolves
//! a chunk, seeks the decryptor to the ciphertext byte it needs, which in
//! turn seeks the underlying source to a frame boundary.
//!
//! The backend, key source, and file metadata live behind the
//! [`BlobStore`], [`KeyProvider`], and [`Catalog`] traits — this crate
//! only wires streams together.

pub mod catalog;
pub mod pipeline;
pub mod store;

pub use catalog::{Catalog, FileEntry};
pub use pipeline::{open_object, open_stream, store_stream, ObjectReader, ObjectWriter};
pub use store::{BlobStore, ContentId, KeyProvider, ObjectSource};
