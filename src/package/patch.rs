//! Best-effort in-place resource patching for `PackageWriteOptions::preserve_holes`.
//!
//! Three outcomes, in order of preference: swap the resource's bytes in its
//! existing span when the new payload fits and its compressed-ness doesn't
//! change; relocate it into an existing hole-table entry when it grows and a
//! hole is large enough; otherwise report that no in-place patch is possible
//! so the caller falls back to [`crate::package::PackageBuilder`]'s full
//! rewrite. A hole freed by relocating a resource is recorded only when the
//! hole table's on-disk allocation has a free slot for it — DBPF has no
//! notion of hole-table slack, so in practice a freshly built package's hole
//! table is already full (or empty) and the freed span is left as
//! unreferenced dead space rather than failing the patch.

use std::fs::OpenOptions;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::byte_stream::write_u32_le;
use crate::error::{DbpfError, Result};
use crate::package::hole_table::{self, Hole};
use crate::package::index::ResourceKey;
use crate::package::{Package, PackageOpenOptions, PackageWriteOptions};
use crate::qfs;

/// Attempts to replace `key`'s payload in place. `Ok(true)` means the patch
/// was applied and the file on disk now reflects it; `Ok(false)` means the
/// package was left untouched and the caller should fall back to a full
/// rewrite via [`crate::package::PackageBuilder`].
pub fn patch_resource_in_place(
    path: impl AsRef<Path>,
    key: ResourceKey,
    data: Vec<u8>,
    write_options: &PackageWriteOptions,
) -> Result<bool> {
    let path = path.as_ref();
    let package = Package::open(path, PackageOpenOptions::default())?;

    let entry_index = package
        .entries()
        .iter()
        .position(|e| e.key == key)
        .ok_or_else(|| DbpfError::PropertyNotFound(key.to_string()))?;
    let entry = package.entries()[entry_index];
    let was_compressed = package.is_compressed(&key);

    let compressed = if write_options.compress_new { qfs::try_compress(&data) } else { None };
    let (blob, is_compressed): (&[u8], bool) = match &compressed {
        Some(c) => (c.as_slice(), true),
        None => (data.as_slice(), false),
    };

    if is_compressed != was_compressed {
        // Flipping compressed-ness means adding or removing a compression
        // directory record, which can change that resource's own byte size.
        // Out of scope for an in-place patch.
        return Ok(false);
    }

    let entry_len = package.header.index_entry_len() as u64;
    let record_offset = package.header.resolved_index_offset() + entry_index as u64 * entry_len;
    let offset_field_offset = record_offset + entry_len - 8;
    let file_size_field_offset = record_offset + entry_len - 4;

    let new_offset = if blob.len() as u32 <= entry.file_size {
        entry.offset
    } else {
        let hole_offset = package.header.hole_offset as u64;
        let hole_entry_count = package.header.hole_entry_count;
        let mut buf = vec![0u8; package.header.hole_size as usize];
        {
            let mut f = std::fs::File::open(path)?;
            f.seek(SeekFrom::Start(hole_offset))?;
            f.read_exact(&mut buf)?;
        }
        let mut holes = hole_table::read_holes(&mut Cursor::new(&buf[..]), hole_entry_count)?;

        let Some(relocated_offset) = hole_table::best_fit(&mut holes, blob.len() as u32) else {
            return Ok(false);
        };

        if holes.len() < hole_entry_count as usize {
            holes.push(Hole { offset: entry.offset, size: entry.file_size });
        }
        let mut hole_bytes = Vec::new();
        hole_table::write_holes(&mut hole_bytes, &holes);
        hole_bytes.resize(package.header.hole_size as usize, 0);

        drop(package);
        let mut file = OpenOptions::new().write(true).open(path)?;
        file.seek(SeekFrom::Start(hole_offset))?;
        file.write_all(&hole_bytes)?;
        file.seek(SeekFrom::Start(offset_field_offset))?;
        write_patched_u32(&mut file, relocated_offset)?;

        write_blob_and_size(&path, blob, relocated_offset, file_size_field_offset)?;
        return Ok(true);
    };

    drop(package);
    write_blob_and_size(path, blob, new_offset, file_size_field_offset)?;
    Ok(true)
}

fn write_blob_and_size(path: impl AsRef<Path>, blob: &[u8], offset: u32, file_size_field_offset: u64) -> Result<()> {
    let mut file = OpenOptions::new().write(true).open(path)?;
    file.seek(SeekFrom::Start(offset as u64))?;
    file.write_all(blob)?;
    file.seek(SeekFrom::Start(file_size_field_offset))?;
    write_patched_u32(&mut file, blob.len() as u32)?;
    file.sync_all()?;
    Ok(())
}

fn write_patched_u32(file: &mut std::fs::File, value: u32) -> Result<()> {
    let mut buf = Vec::with_capacity(4);
    write_u32_le(&mut buf, value);
    file.write_all(&buf)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::index::ResourceKey;
    use crate::package::PackageBuilder;

    #[test]
    fn same_size_patch_swaps_bytes_without_moving() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.package");

        let mut builder = PackageBuilder::new();
        let opts = PackageWriteOptions { compress_new: false, preserve_holes: true };
        builder.with_resource(ResourceKey::new(1, 2, 3), vec![1, 2, 3, 4], &opts);
        builder.write_to_file(&path).unwrap();

        let patched = patch_resource_in_place(&path, ResourceKey::new(1, 2, 3), vec![9, 9, 9, 9], &opts).unwrap();
        assert!(patched);

        let package = Package::open(&path, PackageOpenOptions::default()).unwrap();
        assert_eq!(package.resource_bytes(&ResourceKey::new(1, 2, 3)).unwrap(), vec![9, 9, 9, 9]);
    }

    #[test]
    fn shrinking_patch_updates_file_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.package");

        let mut builder = PackageBuilder::new();
        let opts = PackageWriteOptions { compress_new: false, preserve_holes: true };
        builder.with_resource(ResourceKey::new(1, 2, 3), vec![1, 2, 3, 4, 5, 6], &opts);
        builder.write_to_file(&path).unwrap();

        let patched = patch_resource_in_place(&path, ResourceKey::new(1, 2, 3), vec![7, 7], &opts).unwrap();
        assert!(patched);

        let package = Package::open(&path, PackageOpenOptions::default()).unwrap();
        assert_eq!(package.resource_bytes(&ResourceKey::new(1, 2, 3)).unwrap(), vec![7, 7]);
    }

    #[test]
    fn growth_with_no_hole_table_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.package");

        let mut builder = PackageBuilder::new();
        let opts = PackageWriteOptions { compress_new: false, preserve_holes: true };
        builder.with_resource(ResourceKey::new(1, 2, 3), vec![1, 2], &opts);
        builder.write_to_file(&path).unwrap();

        let patched =
            patch_resource_in_place(&path, ResourceKey::new(1, 2, 3), vec![1, 2, 3, 4, 5, 6], &opts).unwrap();
        assert!(!patched);

        // Original bytes are untouched since the patch reported failure.
        let package = Package::open(&path, PackageOpenOptions::default()).unwrap();
        assert_eq!(package.resource_bytes(&ResourceKey::new(1, 2, 3)).unwrap(), vec![1, 2]);
    }
}
