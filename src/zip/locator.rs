//! Locating the End of Central Directory record from the tail of the resource.
//!
//! The record is 22 bytes followed by a comment of up to 65535 bytes, so its
//! position is unknown until it is found. The search runs as a short sequence
//! of probes:
//!
//! 1. [`Probe::Tail`]: the last 22 bytes, which is the whole record when the
//!    archive has no comment.
//! 2. [`Probe::Window`]: suffix windows of 256, 1024 and 65536 bytes (plus the
//!    record size), each scanned from the end for the rightmost signature.
//!
//! The first probe that yields a record ends the search; running out of
//! windows means the resource is not a ZIP archive.

use tracing::debug;

use crate::error::{Error, Result, TransportError};
use crate::io::{ByteRange, Fetched, RangeFetch};

use super::structures::EndOfCentralDirectoryRecord;

/// Comment lengths covered by the successive search windows. The last one
/// covers the maximum comment size (65535 bytes).
pub const SEARCH_WINDOWS: [u64; 3] = [1 << 8, 1 << 10, 1 << 16];

const EOCD_SIZE: usize = EndOfCentralDirectoryRecord::SIZE;

/// One step of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Read exactly the record size from the end.
    Tail,
    /// Read `SEARCH_WINDOWS[i]` plus the record size from the end.
    Window(usize),
}

impl Probe {
    /// The probe to run when this one found nothing, or `None` once every
    /// window has been tried.
    pub fn widen(self) -> Option<Probe> {
        match self {
            Probe::Tail => Some(Probe::Window(0)),
            Probe::Window(i) if i + 1 < SEARCH_WINDOWS.len() => Some(Probe::Window(i + 1)),
            Probe::Window(_) => None,
        }
    }

    pub fn range(self) -> ByteRange {
        match self {
            Probe::Tail => ByteRange::Suffix(EOCD_SIZE as u64),
            Probe::Window(i) => ByteRange::Suffix(SEARCH_WINDOWS[i] + EOCD_SIZE as u64),
        }
    }
}

/// Find and decode the End of Central Directory record.
///
/// # Errors
///
/// [`Error::NotAZipArchive`] when no probe finds the signature, or a
/// transport error from any probe.
pub async fn locate_eocd<F: RangeFetch + ?Sized>(fetcher: &F) -> Result<EndOfCentralDirectoryRecord> {
    let mut probe = Some(Probe::Tail);

    while let Some(current) = probe {
        let range = current.range();
        let fetched = fetcher.fetch(range).await?;

        let found = match current {
            Probe::Tail => parse_tail(&fetched, range)?,
            Probe::Window(_) => search_window(&fetched, range)?,
        };

        if let Some(record) = found {
            debug!(
                "Found end of central directory at byte {} ({} entries, comment {} bytes)",
                record.location, record.total_entries, record.comment_len
            );
            return Ok(record);
        }

        debug!("No end of central directory record in `{range}`");
        probe = current.widen();
    }

    Err(Error::NotAZipArchive)
}

/// Accept the tail only when it is a complete record with an empty comment.
fn parse_tail(fetched: &Fetched, range: ByteRange) -> Result<Option<EndOfCentralDirectoryRecord>> {
    let data = &fetched.data;
    if data.len() != EOCD_SIZE
        || &data[0..4] != EndOfCentralDirectoryRecord::SIGNATURE
        || data[EOCD_SIZE - 2..] != [0, 0]
    {
        return Ok(None);
    }

    let location = match (fetched.total_size(), fetched.start_offset()) {
        (Some(total), start) => match total.checked_sub(EOCD_SIZE as u64) {
            Some(location) => location,
            None => start.ok_or_else(|| missing_content_range(range))?,
        },
        (None, Some(start)) => start,
        (None, None) => return Err(missing_content_range(range)),
    };

    Ok(EndOfCentralDirectoryRecord::parse(data, location))
}

/// Decode the record at the rightmost signature in the window.
///
/// A signature too close to the end to hold a whole record cannot be the
/// real one, so the scan continues to its left.
fn search_window(fetched: &Fetched, range: ByteRange) -> Result<Option<EndOfCentralDirectoryRecord>> {
    let data = &fetched.data;
    let Some(index) = rfind_signature(data) else {
        return Ok(None);
    };

    let start = fetched
        .start_offset()
        .ok_or_else(|| missing_content_range(range))?;

    Ok(EndOfCentralDirectoryRecord::parse(&data[index..], start + index as u64))
}

/// Index of the rightmost signature that is followed by a whole record.
fn rfind_signature(data: &[u8]) -> Option<usize> {
    if data.len() < EOCD_SIZE {
        return None;
    }
    (0..=data.len() - EOCD_SIZE)
        .rev()
        .find(|&i| &data[i..i + 4] == EndOfCentralDirectoryRecord::SIGNATURE)
}

fn missing_content_range(range: ByteRange) -> Error {
    Error::Transport(TransportError::MissingContentRange {
        range: range.to_string(),
    })
}
