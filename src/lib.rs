//! # remotezip
//!
//! Random-access reading of ZIP archive entries over HTTP Range requests.
//!
//! The central directory of a ZIP archive sits at the end of the file behind a
//! variable-length comment. This crate probes the tail of a remote resource for
//! the End of Central Directory record, fetches exactly the directory's byte
//! range, and afterwards fetches only the bytes of the entries that are read.
//!
//! ## Features
//!
//! - Archives on HTTP/HTTPS servers that honour `Range` requests, or local files
//! - Archive comments, including comments that contain signature-like bytes
//! - Archives with leading non-ZIP data (self-extracting stubs)
//! - STORED and DEFLATE entries, with CRC-32 verification
//! - Configurable code page for names without the UTF-8 flag
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use remotezip::{HttpRangeFetcher, RemoteZip};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fetcher = Arc::new(HttpRangeFetcher::new("https://example.com/archive.zip")?);
//!     let archive = RemoteZip::open(fetcher.clone()).await?;
//!
//!     for entry in archive.all() {
//!         println!("{} {}", entry.modified, entry.file_name);
//!     }
//!
//!     println!("{} bytes transferred", fetcher.transferred_bytes());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod zip;

pub use cli::Cli;
pub use error::{Error, Result, TransportError};
pub use io::{
    ByteRange, ContentRange, Fetched, HttpOptions, HttpRangeFetcher, LocalFileFetcher, RangeFetch,
};
pub use zip::{
    ArchiveIndex, ArchiveOptions, CompressionMethod, DosDateTime, EndOfCentralDirectoryRecord,
    EntryDescriptor, LegacyEncoding, LocalFileHeader, RawEntry, RemoteZip,
};
