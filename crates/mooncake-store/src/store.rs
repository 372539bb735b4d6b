//! Collaborator contracts
//!
//! The pipeline consumes a content-addressed blob store and a key source;
//! both stay abstract here. The store hands out plain byte streams — it
//! never sees keys or plaintext.

use std::io::{Read, Seek};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use mooncake_crypto::ObjectKey;

/// Identifier of a sealed object in the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(pub String);

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A random-access stream over one stored object.
pub trait ObjectSource: Read + Seek + Send {}

impl<T: Read + Seek + Send> ObjectSource for T {}

pub trait BlobStore {
    /// Store everything `object` yields and return the content id.
    fn put(&self, object: &mut dyn Read) -> Result<ContentId>;

    /// Open a finished object for reading and seeking.
    fn open(&self, id: &ContentId) -> Result<Box<dyn ObjectSource>>;
}

pub trait KeyProvider {
    /// The 32-byte symmetric key for a logical file.
    fn key_for(&self, path: &str) -> Result<ObjectKey>;
}
