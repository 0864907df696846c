use super::{ByteRange, ContentRange, Fetched, RangeFetch};
use crate::error::TransportError;
use async_trait::async_trait;
use std::path::Path;

/// Local file fetcher with the same ranged-read contract as HTTP
pub struct LocalFileFetcher {
    file: std::fs::File,
    size: u64,
}

impl LocalFileFetcher {
    pub fn new(path: &Path) -> Result<Self, TransportError> {
        let file = std::fs::File::open(path)?;
        let size = file.metadata()?.len();
        Ok(Self { file, size })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file.read_exact_at(buf, offset)
        }

        #[cfg(windows)]
        {
            use std::os::windows::fs::FileExt;
            let mut read = 0;
            while read < buf.len() {
                match self.file.seek_read(&mut buf[read..], offset + read as u64)? {
                    0 => return Err(std::io::ErrorKind::UnexpectedEof.into()),
                    n => read += n,
                }
            }
            Ok(())
        }

        #[cfg(not(any(unix, windows)))]
        {
            use std::io::{Read, Seek, SeekFrom};
            let mut file = &self.file;
            file.seek(SeekFrom::Start(offset))?;
            file.read_exact(buf)
        }
    }
}

#[async_trait]
impl RangeFetch for LocalFileFetcher {
    async fn fetch(&self, range: ByteRange) -> Result<Fetched, TransportError> {
        let (start, end) = range.resolve(self.size);
        let mut data = vec![0u8; (end - start) as usize];
        self.read_exact_at(start, &mut data)?;

        let content_range = (end > start).then(|| ContentRange {
            start,
            end: end - 1,
            total: Some(self.size),
        });

        Ok(Fetched {
            data,
            content_range,
        })
    }
}
