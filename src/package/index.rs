//! The primary index: one record per resource, mapping a `ResourceKey` (type, group,
//! instance, and — in minor-version-1 packages — resource) to the byte range of its
//! payload in the package.

use std::fmt;
use std::io::{Read, Seek, SeekFrom};

use crate::byte_stream::{read_u32_le, write_u32_le};
use crate::error::{DbpfError, Result};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub type_id: u32,
    pub group_id: u32,
    pub instance_id: u32,
    /// Present only in minor-version-1 (24-byte) index entries; `None` for the legacy
    /// 20-byte layout, which has no fourth key component.
    pub resource_id: Option<u32>,
}

impl ResourceKey {
    pub fn new(type_id: u32, group_id: u32, instance_id: u32) -> Self {
        ResourceKey { type_id, group_id, instance_id, resource_id: None }
    }

    pub fn with_resource(type_id: u32, group_id: u32, instance_id: u32, resource_id: u32) -> Self {
        ResourceKey { type_id, group_id, instance_id, resource_id: Some(resource_id) }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resource_id {
            Some(r) => write!(f, "{:08X}-{:08X}-{:08X}-{:08X}", self.type_id, self.group_id, self.instance_id, r),
            None => write!(f, "{:08X}-{:08X}-{:08X}", self.type_id, self.group_id, self.instance_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub key: ResourceKey,
    pub offset: u32,
    /// On-disk size. When the resource is compressed, this is the compressed size;
    /// the decompressed size lives in the compression directory.
    pub file_size: u32,
}

/// Reads `entry_count` fixed-width index records starting at the current position.
pub fn read_index(
    reader: &mut (impl Read + Seek),
    entry_count: u32,
    has_resource_id: bool,
) -> Result<Vec<IndexEntry>> {
    let mut entries = Vec::with_capacity(entry_count as usize);
    for _ in 0..entry_count {
        let type_id = read_u32_le(reader)?;
        let group_id = read_u32_le(reader)?;
        let instance_id = read_u32_le(reader)?;
        let resource_id = if has_resource_id { Some(read_u32_le(reader)?) } else { None };
        let offset = read_u32_le(reader)?;
        let file_size = read_u32_le(reader)?;
        entries.push(IndexEntry {
            key: ResourceKey { type_id, group_id, instance_id, resource_id },
            offset,
            file_size,
        });
    }
    Ok(entries)
}

pub fn write_index(out: &mut Vec<u8>, entries: &[IndexEntry], has_resource_id: bool) {
    for entry in entries {
        write_u32_le(out, entry.key.type_id);
        write_u32_le(out, entry.key.group_id);
        write_u32_le(out, entry.key.instance_id);
        if has_resource_id {
            write_u32_le(out, entry.key.resource_id.unwrap_or(0));
        }
        write_u32_le(out, entry.offset);
        write_u32_le(out, entry.file_size);
    }
}

/// Rejects a primary index containing the same key twice; every caller that builds
/// a `Package` from a parsed index runs this check once, up front.
pub fn check_no_duplicates(entries: &[IndexEntry]) -> Result<()> {
    let mut seen = std::collections::HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(entry.key) {
            return Err(DbpfError::DuplicateIndexKey(entry.key));
        }
    }
    Ok(())
}

pub fn seek_to_index(reader: &mut (impl Read + Seek), offset: u64) -> Result<()> {
    reader.seek(SeekFrom::Start(offset))?;
    Ok(())
}
