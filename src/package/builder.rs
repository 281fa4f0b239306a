//! Write pipeline: assembles a package body, then backpatches the header and index
//! once every resource's final offset and size are known. Mirrors the "write tables
//! with placeholder offsets, stream the data, then seek back and patch" approach used
//! for the DBPF container generally.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;
use log::debug;
use thiserror::Error;

use crate::package::compression_dir::{self, CompressionDirectoryEntry, DIRECTORY_GROUP_ID, DIRECTORY_INSTANCE_ID, DIRECTORY_TYPE_ID};
use crate::package::header::DbpfHeader;
use crate::package::index::{self, IndexEntry, ResourceKey};
use crate::package::PackageWriteOptions;
use crate::qfs;

#[derive(Debug, Error)]
pub enum PackageBuilderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("binary layout error: {0}")]
    Binrw(#[from] binrw::Error),

    #[error("package would contain more than {0} resources")]
    TooManyResources(u32),
}

enum Blob {
    Stored(Vec<u8>),
    Compressed { compressed: Vec<u8>, decompressed_size: u32 },
}

/// Builds a package from scratch (or by re-adding resources copied out of an existing
/// one). Always does a full rewrite; reusing hole-table space for in-place patches is
/// handled by a narrower patch path outside this builder.
pub struct PackageBuilder {
    entries: IndexMap<ResourceKey, Blob>,
    index_minor_version: u32,
}

impl PackageBuilder {
    pub fn new() -> Self {
        PackageBuilder { entries: IndexMap::new(), index_minor_version: 1 }
    }

    /// Forces the legacy 20-byte (no resource-ID) index layout. The default targets
    /// the 24-byte minor-version-1 layout.
    pub fn with_legacy_index(mut self) -> Self {
        self.index_minor_version = 0;
        self
    }

    /// Adds or replaces a resource's payload, compressing it with QFS when `options`
    /// requests it and the data clears the compressibility gate.
    pub fn with_resource(&mut self, key: ResourceKey, data: Vec<u8>, options: &PackageWriteOptions) -> &mut Self {
        let blob = if options.compress_new {
            match qfs::try_compress(&data) {
                Some(compressed) => Blob::Compressed { compressed, decompressed_size: data.len() as u32 },
                None => {
                    crate::package::trace_qfs_refusal("below minimum size or no gain");
                    Blob::Stored(data)
                }
            }
        } else {
            Blob::Stored(data)
        };
        self.entries.insert(key, blob);
        self
    }

    pub fn build_to_vec(&self) -> Result<Vec<u8>, PackageBuilderError> {
        if self.entries.len() > u32::MAX as usize - 1 {
            return Err(PackageBuilderError::TooManyResources(u32::MAX - 1));
        }

        let mut out = Vec::new();
        out.extend_from_slice(&[0u8; crate::package::header::HEADER_LEN as usize]);

        let mut index_entries = Vec::with_capacity(self.entries.len() + 1);
        let mut compression_dir_entries = Vec::new();

        for (key, blob) in &self.entries {
            let offset = out.len() as u32;
            let file_size = match blob {
                Blob::Stored(data) => {
                    out.extend_from_slice(data);
                    data.len() as u32
                }
                Blob::Compressed { compressed, decompressed_size } => {
                    out.extend_from_slice(compressed);
                    compression_dir_entries.push(CompressionDirectoryEntry {
                        type_id: key.type_id,
                        group_id: key.group_id,
                        instance_id: key.instance_id,
                        resource_id: key.resource_id,
                        decompressed_size: *decompressed_size,
                    });
                    compressed.len() as u32
                }
            };
            index_entries.push(IndexEntry { key: *key, offset, file_size });
        }

        let has_resource_id = self.index_minor_version >= 1;

        if !compression_dir_entries.is_empty() {
            let dir_offset = out.len() as u32;
            let mut dir_bytes = Vec::new();
            compression_dir::write_directory(&mut dir_bytes, &compression_dir_entries, has_resource_id);
            let dir_size = dir_bytes.len() as u32;
            out.extend_from_slice(&dir_bytes);
            index_entries.push(IndexEntry {
                key: ResourceKey::new(DIRECTORY_TYPE_ID, DIRECTORY_GROUP_ID, DIRECTORY_INSTANCE_ID),
                offset: dir_offset,
                file_size: dir_size,
            });
        }

        let index_offset = out.len() as u32;
        index::write_index(&mut out, &index_entries, has_resource_id);
        let index_size = out.len() as u32 - index_offset;

        debug!(
            "built package: {} resources, {} compressed, index at {} ({} bytes)",
            index_entries.len(),
            compression_dir_entries.len(),
            index_offset,
            index_size
        );

        let header = DbpfHeader {
            index_entry_count: index_entries.len() as u32,
            index_offset,
            index_size,
            index_minor_version: self.index_minor_version,
            index_offset_v2: index_offset,
            ..Default::default()
        };

        let header_bytes = {
            use binrw::BinWrite;
            let mut buf = std::io::Cursor::new(Vec::new());
            header.write(&mut buf)?;
            buf.into_inner()
        };
        out[..header_bytes.len()].copy_from_slice(&header_bytes);

        Ok(out)
    }

    /// Writes the built package to `path` via a temp file in the same directory
    /// followed by an atomic rename, so a crash or power loss mid-write never leaves
    /// a half-written file at the destination path.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), PackageBuilderError> {
        let path = path.as_ref();
        let bytes = self.build_to_vec()?;

        let file_name = path.file_name().unwrap_or_default().to_string_lossy().into_owned();
        let tmp_path = path.with_file_name(format!(".{file_name}.$new"));

        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(&bytes)?;
            tmp.sync_all()?;
        }

        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

impl Default for PackageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{Package, PackageOpenOptions};

    #[test]
    fn round_trips_a_stored_and_a_compressed_resource() {
        let mut builder = PackageBuilder::new();
        let write_opts = PackageWriteOptions::default();

        let mut repetitive = Vec::new();
        for _ in 0..50 {
            repetitive.extend_from_slice(b"abcdefghijklmnopqrstuvwxyz");
        }
        builder.with_resource(ResourceKey::new(0x1234, 0x5678, 1), repetitive.clone(), &write_opts);
        builder.with_resource(ResourceKey::new(0xABCD, 0xEF01, 2), vec![9, 9, 9], &write_opts);

        let bytes = builder.build_to_vec().unwrap();
        let package = Package::from_bytes(bytes, PackageOpenOptions::default()).unwrap();

        assert_eq!(package.entries().len(), 3); // 2 resources + compression directory
        let a = package.resource_bytes(&ResourceKey::new(0x1234, 0x5678, 1)).unwrap();
        assert_eq!(a, repetitive);
        let b = package.resource_bytes(&ResourceKey::new(0xABCD, 0xEF01, 2)).unwrap();
        assert_eq!(b, vec![9, 9, 9]);
    }

    #[test]
    fn atomic_write_replaces_destination_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.package");

        let mut builder = PackageBuilder::new();
        builder.with_resource(ResourceKey::new(1, 2, 3), vec![1, 2, 3, 4], &PackageWriteOptions::default());
        builder.write_to_file(&path).unwrap();

        assert!(path.exists());
        let package = Package::open(&path, PackageOpenOptions::default()).unwrap();
        assert_eq!(package.resource_bytes(&ResourceKey::new(1, 2, 3)).unwrap(), vec![1, 2, 3, 4]);
    }
}
