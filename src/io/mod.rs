mod http;
mod local;

pub use http::{HttpOptions, HttpRangeFetcher};
pub use local::LocalFileFetcher;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::error::TransportError;

/// A byte range in HTTP `Range` header terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// `start-`: from `start` to the end of the resource.
    From(u64),
    /// `start-end`, both ends inclusive.
    Bounded { start: u64, end: u64 },
    /// `-len`: the last `len` bytes of the resource.
    Suffix(u64),
}

impl ByteRange {
    /// The inclusive range covering `len` bytes starting at `start`.
    ///
    /// `len` must be non-zero.
    pub fn at(start: u64, len: u64) -> Self {
        debug_assert!(len > 0);
        Self::Bounded {
            start,
            end: start + len - 1,
        }
    }

    /// Resolve against a resource of `size` bytes, clamping like an HTTP server
    /// would. Returns the half-open `[start, end)` interval.
    pub fn resolve(&self, size: u64) -> (u64, u64) {
        match *self {
            ByteRange::From(start) => (start.min(size), size),
            ByteRange::Bounded { start, end } => (start.min(size), end.saturating_add(1).min(size)),
            ByteRange::Suffix(len) => (size.saturating_sub(len), size),
        }
    }

    /// Value for the `Range` request header.
    pub fn header_value(&self) -> String {
        format!("bytes={self}")
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteRange::From(start) => write!(f, "{start}-"),
            ByteRange::Bounded { start, end } => write!(f, "{start}-{end}"),
            ByteRange::Suffix(len) => write!(f, "-{len}"),
        }
    }
}

/// A parsed `Content-Range: bytes start-end/total` response header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    pub start: u64,
    pub end: u64,
    /// `None` when the server answered with `*` for the complete length.
    pub total: Option<u64>,
}

impl FromStr for ContentRange {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let rest = value.trim().strip_prefix("bytes").ok_or(())?.trim_start();
        let (span, total) = rest.split_once('/').ok_or(())?;
        let (start, end) = span.split_once('-').ok_or(())?;
        let total = match total.trim() {
            "*" => None,
            total => Some(total.parse().map_err(|_| ())?),
        };
        Ok(Self {
            start: start.trim().parse().map_err(|_| ())?,
            end: end.trim().parse().map_err(|_| ())?,
            total,
        })
    }
}

/// The result of one ranged read.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub data: Vec<u8>,
    pub content_range: Option<ContentRange>,
}

impl Fetched {
    /// Total size of the resource, when the transport reported it.
    pub fn total_size(&self) -> Option<u64> {
        self.content_range.and_then(|range| range.total)
    }

    /// Absolute offset of the first returned byte, when the transport reported it.
    pub fn start_offset(&self) -> Option<u64> {
        self.content_range.map(|range| range.start)
    }
}

/// Random access to a remote (or local) resource through ranged reads.
///
/// Every call is a single attempt; retry policy belongs to the caller.
#[async_trait]
pub trait RangeFetch: Send + Sync {
    /// Read the bytes covered by `range`.
    async fn fetch(&self, range: ByteRange) -> Result<Fetched, TransportError>;
}

#[async_trait]
impl<T: RangeFetch + ?Sized> RangeFetch for std::sync::Arc<T> {
    async fn fetch(&self, range: ByteRange) -> Result<Fetched, TransportError> {
        (**self).fetch(range).await
    }
}
