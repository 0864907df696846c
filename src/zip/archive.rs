//! The archive handle: open once, then list and read entries on demand.

use std::io::Cursor;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::io::{HttpOptions, HttpRangeFetcher, RangeFetch};

use super::decompress::{Decompress, FlateDecompressor};
use super::directory::read_central_directory;
use super::encoding::{LegacyEncoding, decode_text};
use super::entry::{RawEntry, open_raw_entry};
use super::index::ArchiveIndex;
use super::locator::locate_eocd;
use super::structures::EntryDescriptor;

/// Settings applied when opening an archive.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveOptions {
    /// Code page for names without the UTF-8 flag.
    pub legacy_encoding: LegacyEncoding,
    /// Check each extracted entry against its CRC-32.
    pub verify_crc: bool,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            legacy_encoding: LegacyEncoding::default(),
            verify_crc: true,
        }
    }
}

/// A ZIP archive read through ranged fetches.
///
/// Opening reads the end of central directory record and the central
/// directory, nothing else. The resulting [`ArchiveIndex`] never changes, so
/// the handle can be shared and entries read concurrently.
///
/// ## Example
///
/// ```no_run
/// use remotezip::RemoteZip;
///
/// # async fn run() -> remotezip::Result<()> {
/// let archive = RemoteZip::open_url("https://example.com/archive.zip").await?;
/// for name in archive.list() {
///     println!("{name}");
/// }
/// let readme = archive.read_entry("README.txt").await?;
/// println!("{} bytes", readme.len());
/// # Ok(())
/// # }
/// ```
pub struct RemoteZip<F: RangeFetch> {
    fetcher: Arc<F>,
    index: Arc<ArchiveIndex>,
    options: ArchiveOptions,
    decompressor: Arc<dyn Decompress>,
}

impl RemoteZip<HttpRangeFetcher> {
    /// Open the archive at `url` with default settings.
    pub async fn open_url(url: &str) -> Result<Self> {
        Self::open_url_with(url, &HttpOptions::default(), ArchiveOptions::default()).await
    }

    pub async fn open_url_with(
        url: &str,
        http: &HttpOptions,
        options: ArchiveOptions,
    ) -> Result<Self> {
        let fetcher = HttpRangeFetcher::with_options(url, http)?;
        Self::open_with_options(Arc::new(fetcher), options).await
    }
}

impl<F: RangeFetch> RemoteZip<F> {
    pub async fn open(fetcher: Arc<F>) -> Result<Self> {
        Self::open_with_options(fetcher, ArchiveOptions::default()).await
    }

    /// Locate the end record, read the directory and build the index.
    ///
    /// Any failure aborts the open; no partial index is ever returned.
    pub async fn open_with_options(fetcher: Arc<F>, options: ArchiveOptions) -> Result<Self> {
        let eocd = locate_eocd(fetcher.as_ref()).await?;

        if eocd.is_zip64() {
            return Err(Error::Unsupported("ZIP64 archives"));
        }
        if eocd.is_multi_volume() {
            return Err(Error::Unsupported("multi-volume archives"));
        }

        let entries = read_central_directory(fetcher.as_ref(), &eocd, options.legacy_encoding).await?;
        debug!("Indexed {} entries", entries.len());

        Ok(Self {
            fetcher,
            index: Arc::new(ArchiveIndex::new(entries, eocd.comment)),
            options,
            decompressor: Arc::new(FlateDecompressor),
        })
    }

    /// Replace the decompressor used by [`read_entry`](Self::read_entry).
    pub fn with_decompressor(mut self, decompressor: impl Decompress + 'static) -> Self {
        self.decompressor = Arc::new(decompressor);
        self
    }

    pub fn fetcher(&self) -> &Arc<F> {
        &self.fetcher
    }

    /// A shareable snapshot of the index.
    pub fn index(&self) -> Arc<ArchiveIndex> {
        Arc::clone(&self.index)
    }

    /// Entry names in directory order.
    pub fn list(&self) -> Vec<&str> {
        self.index.list()
    }

    pub fn describe(&self, name: &str) -> Result<&EntryDescriptor> {
        self.index.describe(name)
    }

    pub fn all(&self) -> &[EntryDescriptor] {
        self.index.all()
    }

    /// Raw archive comment bytes.
    pub fn comment(&self) -> &[u8] {
        self.index.comment()
    }

    /// The archive comment decoded with the configured legacy encoding.
    pub fn comment_text(&self) -> String {
        decode_text(self.index.comment(), false, self.options.legacy_encoding)
    }

    /// Fetch an entry's compressed bytes without decompressing them.
    pub async fn read_raw(&self, name: &str) -> Result<RawEntry> {
        let descriptor = self.index.describe(name)?;
        open_raw_entry(self.fetcher.as_ref(), descriptor).await
    }

    /// Fetch and decompress an entry.
    pub async fn read_entry(&self, name: &str) -> Result<Vec<u8>> {
        let descriptor = self.index.describe(name)?;
        self.read_descriptor(descriptor).await
    }

    /// Fetch and decompress an entry, returned as a readable byte stream.
    ///
    /// The cursor implements both [`std::io::Read`] and
    /// [`tokio::io::AsyncRead`].
    pub async fn open_entry(&self, name: &str) -> Result<Cursor<Vec<u8>>> {
        self.read_entry(name).await.map(Cursor::new)
    }

    /// Fetch and decompress the entry `descriptor` describes. Useful for
    /// reaching every record when names repeat.
    ///
    /// Encrypted entries always go through the local header checks and fail
    /// with [`Error::EncryptedEntryUnsupported`], whatever their method.
    pub async fn read_descriptor(&self, descriptor: &EntryDescriptor) -> Result<Vec<u8>> {
        let name = descriptor.file_name.as_str();
        let method = descriptor.compression_method;
        if !descriptor.is_encrypted() && !self.decompressor.supports(method) {
            return Err(Error::UnsupportedCompression {
                name: name.to_string(),
                method: method.as_u16(),
            });
        }

        let raw = open_raw_entry(self.fetcher.as_ref(), descriptor).await?;
        let data = self
            .decompressor
            .decompress(method, &raw.data, descriptor.uncompressed_size)
            .map_err(|source| Error::Decompression {
                name: name.to_string(),
                source,
            })?;

        if self.options.verify_crc {
            let actual = crc32fast::hash(&data);
            if actual != descriptor.crc32 {
                return Err(Error::CrcMismatch {
                    name: name.to_string(),
                    expected: descriptor.crc32,
                    actual,
                });
            }
        }

        Ok(data)
    }
}
