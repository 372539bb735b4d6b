//! mooncake-crypto: chunked authenticated encryption
//!
//! Plaintext is cut into fixed-size blocks and each block is sealed as one
//! AEAD frame, so a finished object supports random access at block
//! granularity while every byte stays authenticated.
//!
//! Object layout:
//! ```text
//! [36-byte header][frame 0][frame 1]…
//! header = "mooncake" || version (u16 BE) || cipher (u16 BE)
//!          || key hash (8 bytes) || block size (u32 BE) || 12 zero bytes
//! frame  = nonce (12 bytes) || ciphertext (≤ block size + 16-byte tag)
//! ```
//!
//! The nonce is the little-endian block counter padded with zeroes, so
//! nonces never repeat within an object and a frame's position is a pure
//! function of its index. The last frame may be short; a plaintext that is
//! an exact multiple of the block size gets NO trailing empty frame, and
//! readers derive the tail length from the residual ciphertext bytes.

pub mod cipher;
pub mod header;
pub mod keys;
pub mod reader;
pub mod writer;

pub use cipher::AeadCipher;
pub use header::{Header, HEADER_SIZE};
pub use keys::ObjectKey;
pub use reader::DecryptReader;
pub use writer::EncryptWriter;

/// Size of an object key in bytes (256-bit).
pub const KEY_SIZE: usize = 32;

/// Size of a frame nonce (96-bit, both ciphers).
pub const NONCE_SIZE: usize = 12;

/// Size of an AEAD authentication tag.
pub const TAG_SIZE: usize = 16;
