use std::io;

use thiserror::Error;

pub type MooncakeResult<T> = Result<T, MooncakeError>;

/// Broad classification of a [`MooncakeError`].
///
/// Format and Auth errors are fatal and sticky: a reader that hit one
/// refuses all further operations until dropped. I/O errors pass through
/// verbatim; callers may retry if the wrapped transport is idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Format,
    Auth,
    Range,
    Parameter,
    Io,
    State,
}

#[derive(Debug, Error)]
pub enum MooncakeError {
    #[error("bad magic (expected {expected:?})")]
    BadMagic { expected: &'static str },

    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),

    #[error("corrupt header: {0}")]
    CorruptHeader(&'static str),

    #[error("corrupt trailer: {0}")]
    CorruptTrailer(&'static str),

    #[error("corrupt index: {0}")]
    CorruptIndex(&'static str),

    #[error("object truncated: {0}")]
    Truncated(&'static str),

    #[error("authentication failed for block {block}")]
    AuthFailed { block: u64 },

    #[error("wrong key for this object")]
    WrongKey,

    #[error("seek to negative offset")]
    NegativeSeek,

    #[error("unsupported cipher id {0}")]
    UnsupportedCipher(u16),

    #[error("unknown compression algorithm id {0}")]
    UnknownAlgorithm(u8),

    #[error("block size {0} outside supported range")]
    BadBlockSize(u32),

    #[error("key must be {expected} bytes, got {got}")]
    BadKeyLength { expected: usize, got: usize },

    #[error("chunk decode failed: {0}")]
    DecodeFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("mixing buffered writes with the bulk path is not allowed")]
    MixedMethods,

    #[error("writer is already closed")]
    AlreadyClosed,
}

impl MooncakeError {
    pub fn class(&self) -> ErrorClass {
        use MooncakeError::*;
        match self {
            BadMagic { .. } | UnsupportedVersion(_) | CorruptHeader(_) | CorruptTrailer(_)
            | CorruptIndex(_) | Truncated(_) | DecodeFailed(_) => ErrorClass::Format,
            AuthFailed { .. } | WrongKey => ErrorClass::Auth,
            NegativeSeek => ErrorClass::Range,
            UnsupportedCipher(_) | UnknownAlgorithm(_) | BadBlockSize(_)
            | BadKeyLength { .. } => ErrorClass::Parameter,
            Io(_) => ErrorClass::Io,
            MixedMethods | AlreadyClosed => ErrorClass::State,
        }
    }

    /// Whether a reader that produced this error must refuse further work.
    pub fn is_sticky(&self) -> bool {
        matches!(self.class(), ErrorClass::Format | ErrorClass::Auth)
    }
}

// Sticky streams re-deliver the error that poisoned them, so the enum must
// be clonable. io::Error is not Clone; an equivalent error is rebuilt from
// its kind and message.
impl Clone for MooncakeError {
    fn clone(&self) -> Self {
        use MooncakeError::*;
        match self {
            BadMagic { expected } => BadMagic { expected },
            UnsupportedVersion(v) => UnsupportedVersion(*v),
            CorruptHeader(msg) => CorruptHeader(msg),
            CorruptTrailer(msg) => CorruptTrailer(msg),
            CorruptIndex(msg) => CorruptIndex(msg),
            Truncated(msg) => Truncated(msg),
            AuthFailed { block } => AuthFailed { block: *block },
            WrongKey => WrongKey,
            NegativeSeek => NegativeSeek,
            UnsupportedCipher(id) => UnsupportedCipher(*id),
            UnknownAlgorithm(id) => UnknownAlgorithm(*id),
            BadBlockSize(size) => BadBlockSize(*size),
            BadKeyLength { expected, got } => BadKeyLength {
                expected: *expected,
                got: *got,
            },
            DecodeFailed(msg) => DecodeFailed(msg.clone()),
            Io(err) => Io(io::Error::new(err.kind(), err.to_string())),
            MixedMethods => MixedMethods,
            AlreadyClosed => AlreadyClosed,
        }
    }
}

impl From<MooncakeError> for io::Error {
    fn from(err: MooncakeError) -> io::Error {
        let kind = match err.class() {
            ErrorClass::Io => {
                // Unwrap instead of double-wrapping.
                if let MooncakeError::Io(inner) = err {
                    return inner;
                }
                io::ErrorKind::Other
            }
            ErrorClass::Format | ErrorClass::Auth => io::ErrorKind::InvalidData,
            ErrorClass::Range | ErrorClass::Parameter => io::ErrorKind::InvalidInput,
            ErrorClass::State => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

/// Look through an `io::Error` produced by a stream layer and recover the
/// typed error underneath, if there is one.
pub fn stream_error(err: &io::Error) -> Option<&MooncakeError> {
    err.get_ref()?.downcast_ref()
}
