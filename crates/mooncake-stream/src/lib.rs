//! mooncake-stream: chunk buffer and composable stream adapters
//!
//! Every layer of the object pipeline speaks the same minimal contract —
//! `Read`, optionally `Read + Seek`, `Write`, and an optional `write_to`
//! fast path — so layers stack without buffering amplification. This crate
//! holds the small pieces that glue the pipeline together:
//!
//! - `chunkbuf`: fixed-capacity seekable buffer holding one decoded chunk
//! - `prefix`: yield an already-read prefix before the rest of a stream
//! - `header`: capture the first N bytes of a stream while forwarding them
//! - `limit`: forward at most N bytes, silently dropping the rest
//! - `timeout`: bound the duration of each write with a worker thread
//! - `size`: count bytes written, safe under parallel writers

pub mod chunkbuf;
pub mod header;
pub mod limit;
pub mod prefix;
pub mod size;
pub mod timeout;

pub use chunkbuf::ChunkBuffer;
pub use header::HeaderReader;
pub use limit::LimitWriter;
pub use prefix::{PrefixReader, SeekablePrefixReader};
pub use size::SizeAccumulator;
pub use timeout::TimeoutWriter;
