use flate2::read::DeflateDecoder;
use std::io::{self, Read};

use super::structures::CompressionMethod;

/// Decompression capability used by [`RemoteZip`](super::RemoteZip).
pub trait Decompress: Send + Sync {
    /// Whether `method` can be handled at all.
    fn supports(&self, method: CompressionMethod) -> bool;

    /// Decompress `compressed`, which must expand to exactly `expected_size` bytes.
    fn decompress(
        &self,
        method: CompressionMethod,
        compressed: &[u8],
        expected_size: u64,
    ) -> io::Result<Vec<u8>>;
}

/// STORED and DEFLATE support via `flate2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlateDecompressor;

impl Decompress for FlateDecompressor {
    fn supports(&self, method: CompressionMethod) -> bool {
        matches!(method, CompressionMethod::Stored | CompressionMethod::Deflate)
    }

    fn decompress(
        &self,
        method: CompressionMethod,
        compressed: &[u8],
        expected_size: u64,
    ) -> io::Result<Vec<u8>> {
        let data = match method {
            CompressionMethod::Stored => compressed.to_vec(),
            CompressionMethod::Deflate => {
                // The declared size is untrusted; grow from a bounded guess.
                let capacity = expected_size.min(compressed.len() as u64 * 4);
                let mut out = Vec::with_capacity(capacity as usize);
                // Read one byte past the expected size so oversized streams are caught.
                DeflateDecoder::new(compressed)
                    .take(expected_size + 1)
                    .read_to_end(&mut out)?;
                out
            }
            CompressionMethod::Unknown(method) => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    format!("compression method {method}"),
                ));
            }
        };

        if data.len() as u64 != expected_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("expected {expected_size} bytes, got {}", data.len()),
            ));
        }
        Ok(data)
    }
}
