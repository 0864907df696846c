use std::collections::HashMap;

use crate::error::{Error, Result};

use super::structures::EntryDescriptor;

/// Immutable catalog of an archive's entries.
///
/// Keeps directory order for listing and a name lookup table. When a name
/// occurs more than once, lookups return the last occurrence; listings still
/// show every record.
#[derive(Debug, Clone, Default)]
pub struct ArchiveIndex {
    entries: Vec<EntryDescriptor>,
    by_name: HashMap<String, usize>,
    comment: Vec<u8>,
}

impl ArchiveIndex {
    pub fn new(entries: Vec<EntryDescriptor>, comment: Vec<u8>) -> Self {
        let mut by_name = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            by_name.insert(entry.file_name.clone(), i);
        }
        Self {
            entries,
            by_name,
            comment,
        }
    }

    /// Entry names in directory order.
    pub fn list(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.file_name.as_str()).collect()
    }

    pub fn describe(&self, name: &str) -> Result<&EntryDescriptor> {
        self.by_name
            .get(name)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// All descriptors in directory order.
    pub fn all(&self) -> &[EntryDescriptor] {
        &self.entries
    }

    /// Archive comment, possibly empty or truncated.
    pub fn comment(&self) -> &[u8] {
        &self.comment
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zip::structures::{CompressionMethod, DosDateTime};

    fn entry(name: &str, header_offset: u64) -> EntryDescriptor {
        EntryDescriptor {
            file_name: name.to_string(),
            raw_file_name: name.as_bytes().to_vec(),
            create_version: 20,
            create_system: 0,
            extract_version: 20,
            reserved: 0,
            flags: 0,
            compression_method: CompressionMethod::Stored,
            compressed_size: 0,
            uncompressed_size: 0,
            crc32: 0,
            header_offset,
            last_mod_time: 0,
            last_mod_date: 0x21,
            modified: DosDateTime::from_dos(0x21, 0),
            extra: vec![],
            comment: vec![],
            internal_attrs: 0,
            external_attrs: 0,
            volume: 0,
        }
    }

    #[test]
    fn keeps_directory_order() {
        let index = ArchiveIndex::new(
            vec![entry("b", 0), entry("a", 10), entry("c", 20)],
            b"note".to_vec(),
        );
        assert_eq!(index.list(), vec!["b", "a", "c"]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.comment(), b"note");
        assert_eq!(index.describe("a").unwrap().header_offset, 10);
    }

    #[test]
    fn last_duplicate_wins() {
        let index = ArchiveIndex::new(vec![entry("a", 0), entry("b", 10), entry("a", 20)], vec![]);
        assert_eq!(index.list(), vec!["a", "b", "a"]);
        assert_eq!(index.describe("a").unwrap().header_offset, 20);
    }

    #[test]
    fn missing_name() {
        let index = ArchiveIndex::default();
        assert!(index.is_empty());
        assert!(matches!(index.describe("nope"), Err(Error::NotFound(name)) if name == "nope"));
    }
}
