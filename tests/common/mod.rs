//! Shared test utilities for integration tests.
//!
//! Fixtures are written byte by byte so tests control every field: comments,
//! prepended data, flags, and disagreements between the central directory and
//! local headers.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::DeflateEncoder;

use remotezip::{ByteRange, ContentRange, Fetched, RangeFetch, TransportError};

/// Packed DOS date and time for 2015-01-01 13:20:00.
pub const DOS_DATE: u16 = 0x4621;
pub const DOS_TIME: u16 = 0x6A80;

/// One member of a fixture archive.
#[derive(Debug, Clone)]
pub struct FixtureEntry {
    pub name: Vec<u8>,
    pub data: Vec<u8>,
    pub method: u16,
    pub flags: u16,
    /// Name written to the local header when it should differ from the directory.
    pub local_name: Option<Vec<u8>>,
    pub local_extra: Vec<u8>,
    pub central_extra: Vec<u8>,
    pub comment: Vec<u8>,
    /// Overrides the CRC-32 stored in both headers.
    pub crc32: Option<u32>,
}

impl FixtureEntry {
    pub fn stored(name: &str, data: &[u8]) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            data: data.to_vec(),
            method: 0,
            flags: 0,
            local_name: None,
            local_extra: vec![],
            central_extra: vec![],
            comment: vec![],
            crc32: None,
        }
    }

    pub fn deflated(name: &str, data: &[u8]) -> Self {
        Self {
            method: 8,
            ..Self::stored(name, data)
        }
    }

    pub fn flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    pub fn method(mut self, method: u16) -> Self {
        self.method = method;
        self
    }

    pub fn local_name(mut self, name: &str) -> Self {
        self.local_name = Some(name.as_bytes().to_vec());
        self
    }

    pub fn raw_name(mut self, name: &[u8]) -> Self {
        self.name = name.to_vec();
        self
    }

    pub fn local_extra(mut self, extra: &[u8]) -> Self {
        self.local_extra = extra.to_vec();
        self
    }

    pub fn central_extra(mut self, extra: &[u8]) -> Self {
        self.central_extra = extra.to_vec();
        self
    }

    pub fn crc32(mut self, crc: u32) -> Self {
        self.crc32 = Some(crc);
        self
    }

    fn payload(&self) -> Vec<u8> {
        if self.method == 8 {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&self.data).unwrap();
            encoder.finish().unwrap()
        } else {
            self.data.clone()
        }
    }
}

/// A built fixture archive.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub bytes: Vec<u8>,
    /// Local header offsets as recorded in the central directory.
    pub recorded_offsets: Vec<u32>,
    pub cd_offset: u32,
    pub cd_size: u32,
}

/// Build an archive from `entries` with `comment`, preceded by `prefix`.
///
/// Offsets are recorded relative to the end of the prefix, the way a stub
/// prepended to an existing archive leaves them.
pub fn build_zip(entries: &[FixtureEntry], comment: &[u8], prefix: &[u8]) -> Fixture {
    let mut zip = Vec::new();
    let mut central = Vec::new();
    let mut recorded_offsets = Vec::new();

    for entry in entries {
        let payload = entry.payload();
        let crc = entry.crc32.unwrap_or_else(|| crc32fast::hash(&entry.data));
        let local_name = entry.local_name.as_ref().unwrap_or(&entry.name);
        let offset = zip.len() as u32;
        recorded_offsets.push(offset);

        zip.extend_from_slice(b"PK\x03\x04");
        zip.extend_from_slice(&[20, 0]);
        zip.extend_from_slice(&entry.flags.to_le_bytes());
        zip.extend_from_slice(&entry.method.to_le_bytes());
        zip.extend_from_slice(&DOS_TIME.to_le_bytes());
        zip.extend_from_slice(&DOS_DATE.to_le_bytes());
        zip.extend_from_slice(&crc.to_le_bytes());
        zip.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        zip.extend_from_slice(&(entry.data.len() as u32).to_le_bytes());
        zip.extend_from_slice(&(local_name.len() as u16).to_le_bytes());
        zip.extend_from_slice(&(entry.local_extra.len() as u16).to_le_bytes());
        zip.extend_from_slice(local_name);
        zip.extend_from_slice(&entry.local_extra);
        zip.extend_from_slice(&payload);

        central.extend_from_slice(b"PK\x01\x02");
        central.extend_from_slice(&[20, 0, 20, 0]);
        central.extend_from_slice(&entry.flags.to_le_bytes());
        central.extend_from_slice(&entry.method.to_le_bytes());
        central.extend_from_slice(&DOS_TIME.to_le_bytes());
        central.extend_from_slice(&DOS_DATE.to_le_bytes());
        central.extend_from_slice(&crc.to_le_bytes());
        central.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        central.extend_from_slice(&(entry.data.len() as u32).to_le_bytes());
        central.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
        central.extend_from_slice(&(entry.central_extra.len() as u16).to_le_bytes());
        central.extend_from_slice(&(entry.comment.len() as u16).to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&0u32.to_le_bytes());
        central.extend_from_slice(&offset.to_le_bytes());
        central.extend_from_slice(&entry.name);
        central.extend_from_slice(&entry.central_extra);
        central.extend_from_slice(&entry.comment);
    }

    let cd_offset = zip.len() as u32;
    let cd_size = central.len() as u32;
    zip.extend_from_slice(&central);
    zip.extend_from_slice(&eocd(entries.len() as u16, cd_size, cd_offset, comment));

    let mut bytes = prefix.to_vec();
    bytes.extend_from_slice(&zip);

    Fixture {
        bytes,
        recorded_offsets,
        cd_offset,
        cd_size,
    }
}

/// An End of Central Directory record followed by `comment`.
pub fn eocd(entries: u16, cd_size: u32, cd_offset: u32, comment: &[u8]) -> Vec<u8> {
    let mut data = b"PK\x05\x06".to_vec();
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&entries.to_le_bytes());
    data.extend_from_slice(&entries.to_le_bytes());
    data.extend_from_slice(&cd_size.to_le_bytes());
    data.extend_from_slice(&cd_offset.to_le_bytes());
    data.extend_from_slice(&(comment.len() as u16).to_le_bytes());
    data.extend_from_slice(comment);
    data
}

/// In-memory resource that records every requested range.
pub struct RecordingFetcher {
    data: Vec<u8>,
    requests: Mutex<Vec<ByteRange>>,
}

impl RecordingFetcher {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ByteRange> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl RangeFetch for RecordingFetcher {
    async fn fetch(&self, range: ByteRange) -> Result<Fetched, TransportError> {
        self.requests.lock().unwrap().push(range);

        let size = self.data.len() as u64;
        let (start, end) = range.resolve(size);
        Ok(Fetched {
            data: self.data[start as usize..end as usize].to_vec(),
            content_range: (end > start).then(|| ContentRange {
                start,
                end: end - 1,
                total: Some(size),
            }),
        })
    }
}
