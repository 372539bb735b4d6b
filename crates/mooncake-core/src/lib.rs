//! mooncake-core: shared error taxonomy and stream parameters
//!
//! Everything the stream crates have in common lives here:
//! - `error`: one typed error enum covering format, auth, range, parameter,
//!   I/O and state failures, plus helpers to cross the `std::io` boundary
//! - `types`: the wire identifiers for ciphers and compression algorithms
//! - `config`: the encoding parameters chosen at write time and recorded
//!   by the catalog

pub mod config;
pub mod error;
pub mod types;

pub use config::StreamConfig;
pub use error::{stream_error, ErrorClass, MooncakeError, MooncakeResult};
pub use types::{AlgorithmId, CipherId};
