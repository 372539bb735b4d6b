//! mooncake-compress: seekable block compression
//!
//! Standard compressed streams must be decoded from the start to reach any
//! offset. For random-access reads the stream is instead cut into chunks
//! (64 KiB of uncompressed data each), compressed chunk by chunk, and
//! indexed: an array of `(raw_off, zip_off)` records at the tail maps
//! uncompressed offsets to positions in the compressed body.
//!
//! Object layout:
//! ```text
//! [12-byte header][compressed chunks][index records][16-byte trailer]
//! header  = "cz01" || algo (u8) || flags (u8) || 6 zero bytes
//! record  = raw_off (u64 BE) || zip_off (u64 BE), zip_off relative to body
//! trailer = index size (u64 BE) || "cztrail1"
//! ```
//!
//! The index always carries a start sentinel `(0, 0)` and an end sentinel
//! holding the totals, so a seek is one binary search. Objects are
//! write-once: [`ChunkWriter`] produces them in a single forward pass,
//! [`ChunkReader`] serves reads and seeks over a finished object.

pub mod algo;
pub mod format;
pub mod reader;
pub mod writer;

pub use algo::{algorithm_for, Algorithm};
pub use format::{Header, Record, Trailer, HEADER_SIZE, RECORD_SIZE, TRAILER_SIZE};
pub use reader::ChunkReader;
pub use writer::ChunkWriter;
