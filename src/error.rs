//! Error types for remote ZIP operations.
//!
//! Every fallible operation in this crate returns [`Result<T>`]. Errors are
//! handed to the immediate caller and never retried: a failure while opening
//! an archive aborts the open, and a failure while opening one entry leaves
//! the index and every other entry untouched.

use std::io;

use thiserror::Error;

/// Result type alias using the crate's [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure of the ranged-read capability.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("request for `{range}` failed with status: {status}")]
    Status {
        range: String,
        status: reqwest::StatusCode,
    },

    #[error("response to `{range}` did not report its position (no usable Content-Range)")]
    MissingContentRange { range: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors raised while opening a remote archive or one of its entries.
#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("File is not a zip file: no end of central directory record found")]
    NotAZipArchive,

    #[error("corrupt central directory at byte {offset}: {reason}")]
    CorruptDirectory { offset: u64, reason: String },

    #[error("There is no item named `{0}` in the archive")]
    NotFound(String),

    #[error("corrupt entry `{name}`: {reason}")]
    CorruptEntry { name: String, reason: String },

    #[error("File name in directory `{directory}` and header `{header}` differ")]
    InconsistentEntry { directory: String, header: String },

    #[error("File `{0}` is encrypted, not supported")]
    EncryptedEntryUnsupported(String),

    #[error("entry `{name}` uses unsupported compression method {method}")]
    UnsupportedCompression { name: String, method: u16 },

    #[error("failed to decompress `{name}`")]
    Decompression {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("bad CRC-32 for `{name}`: expected {expected:#010x}, got {actual:#010x}")]
    CrcMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },

    #[error("unsupported archive layout: {0}")]
    Unsupported(&'static str),
}

impl Error {
    pub(crate) fn corrupt_directory(offset: u64, reason: impl Into<String>) -> Self {
        Self::CorruptDirectory {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt_entry(name: &str, reason: impl Into<String>) -> Self {
        Self::CorruptEntry {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
