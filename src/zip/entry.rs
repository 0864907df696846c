//! Fetching one entry's compressed payload.
//!
//! Opening an entry reads only that entry's byte region: the fixed local
//! header, the filename that follows it, and the compressed payload. Entries
//! touch disjoint ranges and share nothing mutable, so several may be opened
//! concurrently against the same fetcher.

use tracing::debug;

use crate::error::{Error, Result};
use crate::io::{ByteRange, RangeFetch};

use super::structures::{EntryDescriptor, LocalFileHeader};

/// An entry's compressed bytes, ready for the decompressor.
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub descriptor: EntryDescriptor,
    pub local_header: LocalFileHeader,
    /// Exactly `descriptor.compressed_size` bytes.
    pub data: Vec<u8>,
}

/// Fetch the local header, name and payload for `descriptor`.
///
/// # Errors
///
/// * [`Error::CorruptEntry`] if the local header is missing or short.
/// * [`Error::InconsistentEntry`] if the local header names a different file.
/// * [`Error::EncryptedEntryUnsupported`] if the entry is encrypted; raised
///   before any payload byte is requested.
pub async fn open_raw_entry<F: RangeFetch + ?Sized>(
    fetcher: &F,
    descriptor: &EntryDescriptor,
) -> Result<RawEntry> {
    let name = descriptor.file_name.as_str();
    let mut offset = descriptor.header_offset;

    let fetched = fetcher
        .fetch(ByteRange::at(offset, LocalFileHeader::SIZE as u64))
        .await?;
    let local_header = LocalFileHeader::parse(&fetched.data)
        .ok_or_else(|| Error::corrupt_entry(name, "Bad magic number for file header"))?;
    offset += LocalFileHeader::SIZE as u64;

    let header_name = match local_header.file_name_length as u64 {
        0 => Vec::new(),
        len => fetcher.fetch(ByteRange::at(offset, len)).await?.data,
    };
    if header_name != descriptor.raw_file_name {
        return Err(Error::InconsistentEntry {
            directory: name.to_string(),
            header: String::from_utf8_lossy(&header_name).into_owned(),
        });
    }

    if descriptor.is_encrypted() {
        return Err(Error::EncryptedEntryUnsupported(name.to_string()));
    }

    let data_offset = descriptor.header_offset + local_header.data_offset();
    let data = match descriptor.compressed_size {
        0 => Vec::new(),
        len => fetcher.fetch(ByteRange::at(data_offset, len)).await?.data,
    };
    if data.len() as u64 != descriptor.compressed_size {
        return Err(Error::corrupt_entry(
            name,
            format!(
                "expected {} compressed bytes at byte {data_offset}, got {}",
                descriptor.compressed_size,
                data.len()
            ),
        ));
    }

    debug!(
        "Fetched {} ({} bytes, {})",
        name, descriptor.compressed_size, descriptor.compression_method
    );

    Ok(RawEntry {
        descriptor: descriptor.clone(),
        local_header,
        data,
    })
}
