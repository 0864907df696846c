//! Fixed-layout ZIP records and their pure decoders.
//!
//! Every decoder takes a byte slice positioned at the record's signature and
//! returns `None` when the slice is too short or the signature does not match.
//! Callers attach context (offsets, entry names) to that failure.

use byteorder::{ByteOrder, LittleEndian};
use std::fmt;

/// General purpose flag: entry is encrypted.
pub const FLAG_ENCRYPTED: u16 = 0x0001;
/// General purpose flag: sizes and CRC follow the payload in a data descriptor.
pub const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;
/// General purpose flag (EFS): filename and comment are UTF-8.
pub const FLAG_UTF8: u16 = 0x0800;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionMethod::Stored => f.write_str("stored"),
            CompressionMethod::Deflate => f.write_str("deflate"),
            CompressionMethod::Unknown(v) => write!(f, "method {v}"),
        }
    }
}

/// Calendar fields decoded from a packed MS-DOS date and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DosDateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DosDateTime {
    /// Decode the packed date and time words. Values are not range-checked,
    /// so a corrupt field decodes to an out-of-range calendar value.
    pub fn from_dos(date: u16, time: u16) -> Self {
        Self {
            year: (date >> 9) + 1980,
            month: ((date >> 5) & 0x0F) as u8,
            day: (date & 0x1F) as u8,
            hour: (time >> 11) as u8,
            minute: ((time >> 5) & 0x3F) as u8,
            second: ((time & 0x1F) * 2) as u8,
        }
    }
}

impl fmt::Display for DosDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// End of Central Directory (EOCD) record, as found in the remote resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectoryRecord {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    /// Directory offset as recorded in the file, before any correction.
    pub cd_offset: u32,
    pub comment_len: u16,
    /// Archive comment. May be shorter than `comment_len` when the probe
    /// window that found the record ended before the comment did.
    pub comment: Vec<u8>,
    /// Absolute offset of this record in the remote resource.
    pub location: u64,
}

impl EndOfCentralDirectoryRecord {
    pub const SIGNATURE: &'static [u8; 4] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    /// Decode a record starting at `data[0]` that was found at `location`.
    ///
    /// The comment is whatever part of the declared comment `data` holds.
    pub fn parse(data: &[u8], location: u64) -> Option<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return None;
        }

        let comment_len = LittleEndian::read_u16(&data[20..22]);
        let comment_end = (Self::SIZE + comment_len as usize).min(data.len());

        Some(Self {
            disk_number: LittleEndian::read_u16(&data[4..6]),
            disk_with_cd: LittleEndian::read_u16(&data[6..8]),
            disk_entries: LittleEndian::read_u16(&data[8..10]),
            total_entries: LittleEndian::read_u16(&data[10..12]),
            cd_size: LittleEndian::read_u32(&data[12..16]),
            cd_offset: LittleEndian::read_u32(&data[16..20]),
            comment_len,
            comment: data[Self::SIZE..comment_end].to_vec(),
            location,
        })
    }

    /// Whether any field holds a ZIP64 sentinel value.
    pub fn is_zip64(&self) -> bool {
        self.disk_entries == 0xFFFF
            || self.total_entries == 0xFFFF
            || self.cd_size == 0xFFFFFFFF
            || self.cd_offset == 0xFFFFFFFF
    }

    pub fn is_multi_volume(&self) -> bool {
        self.disk_number != 0 || self.disk_with_cd != 0 || self.disk_entries != self.total_entries
    }

    /// Shift between recorded and true offsets: non-zero when other data was
    /// prepended to the archive (for example a self-extracting stub).
    pub fn concat(&self) -> i64 {
        self.location as i64 - self.cd_size as i64 - self.cd_offset as i64
    }
}

/// Fixed 46-byte part of a central directory file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CentralDirectoryHeader {
    pub create_version: u8,
    pub create_system: u8,
    pub extract_version: u8,
    pub reserved: u8,
    pub flags: u16,
    pub compression_method: u16,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
    pub extra_field_length: u16,
    pub comment_length: u16,
    pub disk_number_start: u16,
    pub internal_attrs: u16,
    pub external_attrs: u32,
    pub lfh_offset: u32,
}

impl CentralDirectoryHeader {
    pub const SIGNATURE: &'static [u8; 4] = b"PK\x01\x02";
    pub const SIZE: usize = 46;

    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return None;
        }

        Some(Self {
            create_version: data[4],
            create_system: data[5],
            extract_version: data[6],
            reserved: data[7],
            flags: LittleEndian::read_u16(&data[8..10]),
            compression_method: LittleEndian::read_u16(&data[10..12]),
            last_mod_time: LittleEndian::read_u16(&data[12..14]),
            last_mod_date: LittleEndian::read_u16(&data[14..16]),
            crc32: LittleEndian::read_u32(&data[16..20]),
            compressed_size: LittleEndian::read_u32(&data[20..24]),
            uncompressed_size: LittleEndian::read_u32(&data[24..28]),
            file_name_length: LittleEndian::read_u16(&data[28..30]),
            extra_field_length: LittleEndian::read_u16(&data[30..32]),
            comment_length: LittleEndian::read_u16(&data[32..34]),
            disk_number_start: LittleEndian::read_u16(&data[34..36]),
            internal_attrs: LittleEndian::read_u16(&data[36..38]),
            external_attrs: LittleEndian::read_u32(&data[38..42]),
            lfh_offset: LittleEndian::read_u32(&data[42..46]),
        })
    }

    /// Size of the whole record including its variable-length tail.
    pub fn record_len(&self) -> usize {
        Self::SIZE
            + self.file_name_length as usize
            + self.extra_field_length as usize
            + self.comment_length as usize
    }
}

/// Fixed 30-byte local file header stored in front of each entry's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalFileHeader {
    pub extract_version: u8,
    pub extract_system: u8,
    pub flags: u16,
    pub compression_method: u16,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
    pub extra_field_length: u16,
}

impl LocalFileHeader {
    pub const SIGNATURE: &'static [u8; 4] = b"PK\x03\x04";
    pub const SIZE: usize = 30;

    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return None;
        }

        Some(Self {
            extract_version: data[4],
            extract_system: data[5],
            flags: LittleEndian::read_u16(&data[6..8]),
            compression_method: LittleEndian::read_u16(&data[8..10]),
            last_mod_time: LittleEndian::read_u16(&data[10..12]),
            last_mod_date: LittleEndian::read_u16(&data[12..14]),
            crc32: LittleEndian::read_u32(&data[14..18]),
            compressed_size: LittleEndian::read_u32(&data[18..22]),
            uncompressed_size: LittleEndian::read_u32(&data[22..26]),
            file_name_length: LittleEndian::read_u16(&data[26..28]),
            extra_field_length: LittleEndian::read_u16(&data[28..30]),
        })
    }

    /// Distance from the header's first byte to the first payload byte.
    pub fn data_offset(&self) -> u64 {
        Self::SIZE as u64 + self.file_name_length as u64 + self.extra_field_length as u64
    }
}

/// Metadata of one archive member, decoded from the central directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDescriptor {
    pub file_name: String,
    /// Filename bytes exactly as stored in the directory.
    pub raw_file_name: Vec<u8>,
    pub create_version: u8,
    pub create_system: u8,
    pub extract_version: u8,
    pub reserved: u8,
    pub flags: u16,
    pub compression_method: CompressionMethod,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub crc32: u32,
    /// True position of the local file header in the remote resource,
    /// already corrected for any prepended data.
    pub header_offset: u64,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub modified: DosDateTime,
    pub extra: Vec<u8>,
    pub comment: Vec<u8>,
    pub internal_attrs: u16,
    pub external_attrs: u32,
    pub volume: u16,
}

impl EntryDescriptor {
    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }

    pub fn is_utf8(&self) -> bool {
        self.flags & FLAG_UTF8 != 0
    }

    pub fn has_data_descriptor(&self) -> bool {
        self.flags & FLAG_DATA_DESCRIPTOR != 0
    }

    /// Directory entries end with '/'
    pub fn is_dir(&self) -> bool {
        self.file_name.ends_with('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_dos_date_time() {
        let modified = DosDateTime::from_dos(0x2B21, 0x6A00);
        assert_eq!(
            modified,
            DosDateTime {
                year: 2001,
                month: 9,
                day: 1,
                hour: 13,
                minute: 16,
                second: 0,
            }
        );
        assert_eq!(modified.to_string(), "2001-09-01 13:16:00");
    }

    #[test]
    fn decodes_dos_date_time_seconds() {
        // 2015-01-01 13:20:00, and the odd-second halving of 13:20:58.
        assert_eq!(
            DosDateTime::from_dos(0x4621, 0x6A80).to_string(),
            "2015-01-01 13:20:00"
        );
        assert_eq!(DosDateTime::from_dos(0x4621, 0x6A9D).second, 58);
    }

    fn eocd_bytes(comment: &[u8]) -> Vec<u8> {
        let mut data = b"PK\x05\x06".to_vec();
        data.extend_from_slice(&[0, 0, 0, 0]);
        data.extend_from_slice(&3u16.to_le_bytes());
        data.extend_from_slice(&3u16.to_le_bytes());
        data.extend_from_slice(&150u32.to_le_bytes());
        data.extend_from_slice(&1000u32.to_le_bytes());
        data.extend_from_slice(&(comment.len() as u16).to_le_bytes());
        data.extend_from_slice(comment);
        data
    }

    #[test]
    fn parses_eocd() {
        let record = EndOfCentralDirectoryRecord::parse(&eocd_bytes(b""), 1150).unwrap();
        assert_eq!(record.total_entries, 3);
        assert_eq!(record.cd_size, 150);
        assert_eq!(record.cd_offset, 1000);
        assert!(record.comment.is_empty());
        assert_eq!(record.concat(), 0);
        assert!(!record.is_zip64());
        assert!(!record.is_multi_volume());

        let record = EndOfCentralDirectoryRecord::parse(&eocd_bytes(b""), 1250).unwrap();
        assert_eq!(record.concat(), 100);
    }

    #[test]
    fn parses_truncated_eocd_comment() {
        let data = eocd_bytes(b"hello world");
        let record = EndOfCentralDirectoryRecord::parse(&data[..data.len() - 6], 0).unwrap();
        assert_eq!(record.comment_len, 11);
        assert_eq!(record.comment, b"hello");
    }

    #[test]
    fn rejects_bad_signature() {
        let mut data = eocd_bytes(b"");
        data[3] = 0x07;
        assert!(EndOfCentralDirectoryRecord::parse(&data, 0).is_none());
        assert!(EndOfCentralDirectoryRecord::parse(&data[..10], 0).is_none());
        assert!(LocalFileHeader::parse(b"PK\x03\x04").is_none());
        assert!(CentralDirectoryHeader::parse(&[0u8; 46]).is_none());
    }

    #[test]
    fn parses_local_header() {
        let mut data = b"PK\x03\x04".to_vec();
        data.extend_from_slice(&[20, 0]);
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&8u16.to_le_bytes());
        data.extend_from_slice(&0x6A00u16.to_le_bytes());
        data.extend_from_slice(&0x2B21u16.to_le_bytes());
        data.extend_from_slice(&0xDEADBEEFu32.to_le_bytes());
        data.extend_from_slice(&10u32.to_le_bytes());
        data.extend_from_slice(&20u32.to_le_bytes());
        data.extend_from_slice(&5u16.to_le_bytes());
        data.extend_from_slice(&9u16.to_le_bytes());

        let header = LocalFileHeader::parse(&data).unwrap();
        assert_eq!(header.compression_method, 8);
        assert_eq!(header.crc32, 0xDEADBEEF);
        assert_eq!(header.compressed_size, 10);
        assert_eq!(header.data_offset(), 30 + 5 + 9);
    }
}
