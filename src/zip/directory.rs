//! Reading and decoding the central directory.

use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::io::{ByteRange, RangeFetch};

use super::encoding::{LegacyEncoding, decode_text};
use super::structures::{
    CentralDirectoryHeader, CompressionMethod, DosDateTime, EndOfCentralDirectoryRecord,
    EntryDescriptor, FLAG_UTF8,
};

/// Fetch the central directory described by `eocd` with a single ranged read
/// and decode it into entry descriptors, in directory order.
pub async fn read_central_directory<F: RangeFetch + ?Sized>(
    fetcher: &F,
    eocd: &EndOfCentralDirectoryRecord,
    legacy: LegacyEncoding,
) -> Result<Vec<EntryDescriptor>> {
    let concat = eocd.concat();
    let start = eocd.cd_offset as i64 + concat;
    if start < 0 {
        return Err(Error::corrupt_directory(
            eocd.location,
            format!("central directory would start before the resource ({start})"),
        ));
    }
    let start = start as u64;
    let size = eocd.cd_size as u64;

    if concat != 0 {
        debug!("Archive is preceded by {concat} bytes of other data");
    }

    if size == 0 {
        return Ok(Vec::new());
    }

    let fetched = fetcher.fetch(ByteRange::at(start, size)).await?;
    debug!("Read {} bytes of central directory at byte {start}", fetched.data.len());

    let entries = decode_central_directory(&fetched.data, size, start, concat, legacy)?;

    if entries.len() != eocd.total_entries as usize {
        warn!(
            "End of central directory declares {} entries, but the directory holds {}",
            eocd.total_entries,
            entries.len()
        );
    }

    Ok(entries)
}

/// Decode `cd_size` bytes of directory records from `data`.
///
/// `base` is the absolute position of `data[0]`, used in error reports;
/// `concat` is added to every local header offset.
pub fn decode_central_directory(
    data: &[u8],
    cd_size: u64,
    base: u64,
    concat: i64,
    legacy: LegacyEncoding,
) -> Result<Vec<EntryDescriptor>> {
    let mut entries = Vec::new();
    let mut pos = 0usize;

    while (pos as u64) < cd_size {
        let at = base + pos as u64;
        let record = &data[pos.min(data.len())..];

        if record.len() < CentralDirectoryHeader::SIZE {
            return Err(Error::corrupt_directory(at, "truncated central directory record"));
        }
        let header = CentralDirectoryHeader::parse(record)
            .ok_or_else(|| Error::corrupt_directory(at, "Bad magic number for central directory"))?;

        let record_len = header.record_len();
        if record.len() < record_len {
            return Err(Error::corrupt_directory(
                at,
                format!("record needs {record_len} bytes, only {} left", record.len()),
            ));
        }

        let entry = decode_entry(&header, &record[..record_len], concat, legacy)
            .ok_or_else(|| Error::corrupt_directory(at, "local header offset out of range"))?;
        trace!("{} at byte {}", entry.file_name, entry.header_offset);

        entries.push(entry);
        pos += record_len;
    }

    Ok(entries)
}

/// Build a descriptor from one complete record. `None` when the corrected
/// header offset falls before the start of the resource.
fn decode_entry(
    header: &CentralDirectoryHeader,
    record: &[u8],
    concat: i64,
    legacy: LegacyEncoding,
) -> Option<EntryDescriptor> {
    let name_end = CentralDirectoryHeader::SIZE + header.file_name_length as usize;
    let extra_end = name_end + header.extra_field_length as usize;
    let utf8 = header.flags & FLAG_UTF8 != 0;

    let raw_file_name = record[CentralDirectoryHeader::SIZE..name_end].to_vec();
    let header_offset = u64::try_from(header.lfh_offset as i64 + concat).ok()?;

    Some(EntryDescriptor {
        file_name: decode_text(&raw_file_name, utf8, legacy),
        raw_file_name,
        create_version: header.create_version,
        create_system: header.create_system,
        extract_version: header.extract_version,
        reserved: header.reserved,
        flags: header.flags,
        compression_method: CompressionMethod::from_u16(header.compression_method),
        compressed_size: header.compressed_size as u64,
        uncompressed_size: header.uncompressed_size as u64,
        crc32: header.crc32,
        header_offset,
        last_mod_time: header.last_mod_time,
        last_mod_date: header.last_mod_date,
        modified: DosDateTime::from_dos(header.last_mod_date, header.last_mod_time),
        extra: record[name_end..extra_end].to_vec(),
        comment: record[extra_end..].to_vec(),
        internal_attrs: header.internal_attrs,
        external_attrs: header.external_attrs,
        volume: header.disk_number_start,
    })
}
