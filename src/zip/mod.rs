//! Reading ZIP archives through ranged fetches.
//!
//! ## Architecture
//!
//! Opening an archive runs three steps in sequence, each using only the
//! previous step's output:
//!
//! - [`locator`]: find the End of Central Directory (EOCD) record at the tail
//! - [`directory`]: fetch exactly the central directory and decode it
//! - [`index`]: build the immutable name lookup and ordered listing
//!
//! Reading an entry is an index lookup followed by [`entry`], which fetches
//! the entry's local header, name and payload, and [`decompress`].
//!
//! ## Limitations
//!
//! - No ZIP64 support
//! - No encryption support
//! - No multi-disk archive support

pub mod decompress;
pub mod directory;
pub mod encoding;
pub mod entry;
pub mod index;
pub mod locator;

mod archive;
mod structures;

pub use archive::{ArchiveOptions, RemoteZip};
pub use decompress::{Decompress, FlateDecompressor};
pub use encoding::LegacyEncoding;
pub use entry::RawEntry;
pub use index::ArchiveIndex;
pub use structures::*;
