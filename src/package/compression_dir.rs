//! The compression directory: a special resource (type `0xE86B1EEF`, group `0xE86B1EEF`,
//! instance `0x286B1F03`) listing, for every compressed resource in the package, its
//! decompressed size. Without this entry a resource's compressed bytes cannot be told
//! apart from a resource that is simply stored raw.

use std::io::{Read, Seek};

use crate::byte_stream::{read_u32_le, write_u32_le};
use crate::error::{DbpfError, Result};
use crate::package::index::ResourceKey;

pub const DIRECTORY_TYPE_ID: u32 = 0xE86B1EEF;
pub const DIRECTORY_GROUP_ID: u32 = 0xE86B1EEF;
pub const DIRECTORY_INSTANCE_ID: u32 = 0x286B1F03;

pub fn is_compression_directory_key(key: &ResourceKey) -> bool {
    key.type_id == DIRECTORY_TYPE_ID
        && key.group_id == DIRECTORY_GROUP_ID
        && key.instance_id == DIRECTORY_INSTANCE_ID
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionDirectoryEntry {
    pub type_id: u32,
    pub group_id: u32,
    pub instance_id: u32,
    /// Present only when the directory is framed for a minor-version-1 (24-byte
    /// index) package, matching the primary index's own optional fourth field.
    pub resource_id: Option<u32>,
    pub decompressed_size: u32,
}

impl CompressionDirectoryEntry {
    /// Matches on type/group/instance only, deliberately ignoring `resource_id`:
    /// a freshly-constructed lookup key (e.g. `ResourceKey::new`) carries `None`
    /// even against a minor-version-1 package, where a round-tripped index entry's
    /// `resource_id` is always `Some(_)` once read back off disk.
    pub(crate) fn matches(&self, key: &ResourceKey) -> bool {
        self.type_id == key.type_id && self.group_id == key.group_id && self.instance_id == key.instance_id
    }
}

/// Parses the raw bytes of a compression directory resource: a flat array of
/// 16-byte records (type, group, instance, decompressed_size), or 20-byte records
/// (type, group, instance, resource, decompressed_size) when `has_resource_id` is
/// set, matching the primary index's own minor-version-1 layout — the original
/// reads DIR entries through the same `DBPFindexType` record the primary index
/// uses, just without a stored location/size pair.
pub fn parse_directory(reader: &mut (impl Read + Seek), has_resource_id: bool) -> Result<Vec<CompressionDirectoryEntry>> {
    let mut entries = Vec::new();
    loop {
        let type_id = match read_u32_le(reader) {
            Ok(v) => v,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(DbpfError::Io(e)),
        };
        let group_id = read_u32_le(reader)?;
        let instance_id = read_u32_le(reader)?;
        let resource_id = if has_resource_id { Some(read_u32_le(reader)?) } else { None };
        let decompressed_size = read_u32_le(reader)?;
        entries.push(CompressionDirectoryEntry { type_id, group_id, instance_id, resource_id, decompressed_size });
    }
    Ok(entries)
}

pub fn write_directory(out: &mut Vec<u8>, entries: &[CompressionDirectoryEntry], has_resource_id: bool) {
    for entry in entries {
        write_u32_le(out, entry.type_id);
        write_u32_le(out, entry.group_id);
        write_u32_le(out, entry.instance_id);
        if has_resource_id {
            write_u32_le(out, entry.resource_id.unwrap_or(0));
        }
        write_u32_le(out, entry.decompressed_size);
    }
}

/// Looks up the decompressed size for a key, scanning forward from `start_hint` first
/// (packages tend to list compressed resources in roughly index order, so repeated
/// lookups during a linear pass over the index rarely need to wrap around).
pub fn find_decompressed_size(
    entries: &[CompressionDirectoryEntry],
    key: &ResourceKey,
    start_hint: &mut usize,
) -> Option<u32> {
    let len = entries.len();
    if len == 0 {
        return None;
    }
    for i in 0..len {
        let idx = (*start_hint + i) % len;
        let entry = &entries[idx];
        if entry.matches(key) {
            *start_hint = idx;
            return Some(entry.decompressed_size);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_entries_without_resource_id() {
        let entries = vec![
            CompressionDirectoryEntry { type_id: 1, group_id: 2, instance_id: 3, resource_id: None, decompressed_size: 100 },
            CompressionDirectoryEntry { type_id: 4, group_id: 5, instance_id: 6, resource_id: None, decompressed_size: 200 },
        ];
        let mut out = Vec::new();
        write_directory(&mut out, &entries, false);
        let parsed = parse_directory(&mut Cursor::new(out), false).unwrap();
        assert_eq!(parsed, entries);
    }

    #[test]
    fn round_trips_entries_with_resource_id() {
        let entries = vec![
            CompressionDirectoryEntry { type_id: 1, group_id: 2, instance_id: 3, resource_id: Some(7), decompressed_size: 100 },
            CompressionDirectoryEntry { type_id: 4, group_id: 5, instance_id: 6, resource_id: Some(8), decompressed_size: 200 },
        ];
        let mut out = Vec::new();
        write_directory(&mut out, &entries, true);
        assert_eq!(out.len(), entries.len() * 20);
        let parsed = parse_directory(&mut Cursor::new(out), true).unwrap();
        assert_eq!(parsed, entries);
    }

    #[test]
    fn lookup_wraps_around_from_hint() {
        let entries = vec![
            CompressionDirectoryEntry { type_id: 1, group_id: 1, instance_id: 1, resource_id: None, decompressed_size: 10 },
            CompressionDirectoryEntry { type_id: 2, group_id: 2, instance_id: 2, resource_id: None, decompressed_size: 20 },
            CompressionDirectoryEntry { type_id: 3, group_id: 3, instance_id: 3, resource_id: None, decompressed_size: 30 },
        ];
        let mut hint = 2;
        let size = find_decompressed_size(&entries, &ResourceKey::new(1, 1, 1), &mut hint);
        assert_eq!(size, Some(10));
        assert_eq!(hint, 0);
    }
}
