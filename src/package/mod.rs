//! The DBPF container: header, primary index, compression directory, and hole table,
//! plus the read and write pipelines built on top of them.

pub mod builder;
pub mod compression_dir;
pub mod header;
pub mod hole_table;
pub mod index;
pub mod patch;

use std::collections::HashSet;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use log::{debug, trace, warn};
use memmap2::Mmap;

use crate::error::{DbpfError, Result};
use crate::qfs;
use compression_dir::CompressionDirectoryEntry;
use header::DbpfHeader;
use index::{IndexEntry, ResourceKey};

pub use builder::{PackageBuilder, PackageBuilderError};
pub use hole_table::Hole;
pub use patch::patch_resource_in_place;

enum Backing {
    Mapped(Mmap),
    Memory(Vec<u8>),
}

impl Backing {
    fn as_slice(&self) -> &[u8] {
        match self {
            Backing::Mapped(m) => &m[..],
            Backing::Memory(v) => &v[..],
        }
    }
}

/// Controls how a package is parsed on open.
#[derive(Debug, Clone)]
pub struct PackageOpenOptions {
    /// If non-empty, only resources whose type ID is in this set are eagerly decoded
    /// (decompressed and handed to the typed-resource layer) when iterated; others
    /// are left as opaque compressed or raw bytes accessible via `Package::resource_bytes`.
    /// An empty set means "decode everything requested, nothing eagerly."
    pub decode_types: HashSet<u32>,
    /// Reject headers whose `major_version`/`minor_version` aren't `1.0` or `1.1`
    /// instead of trying to parse them anyway.
    pub strict_header: bool,
}

impl Default for PackageOpenOptions {
    fn default() -> Self {
        PackageOpenOptions { decode_types: HashSet::new(), strict_header: true }
    }
}

/// Controls how a package is written back out.
#[derive(Debug, Clone, Copy)]
pub struct PackageWriteOptions {
    /// Compress newly-added or newly-modified resources with QFS before writing,
    /// provided they clear the compressibility gate (see `qfs::try_compress`).
    pub compress_new: bool,
    /// When patching an existing package in place, try to reuse entries from the
    /// hole table for resources that fit, instead of always appending at the end
    /// and doing a full rewrite.
    pub preserve_holes: bool,
}

impl Default for PackageWriteOptions {
    fn default() -> Self {
        PackageWriteOptions { compress_new: true, preserve_holes: false }
    }
}

/// A parsed DBPF package: the header, primary index, and (if present) the resolved
/// compression directory, backed by either a memory-mapped file or an owned buffer.
pub struct Package {
    backing: Backing,
    pub header: DbpfHeader,
    entries: Vec<IndexEntry>,
    compression_dir: Vec<CompressionDirectoryEntry>,
    options: PackageOpenOptions,
}

impl Package {
    pub fn open(path: impl AsRef<Path>, options: PackageOpenOptions) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_backing(Backing::Mapped(mmap), options)
    }

    pub fn from_bytes(data: Vec<u8>, options: PackageOpenOptions) -> Result<Self> {
        Self::from_backing(Backing::Memory(data), options)
    }

    fn from_backing(backing: Backing, options: PackageOpenOptions) -> Result<Self> {
        use binrw::BinRead;

        let bytes = backing.as_slice();
        if bytes.len() < header::HEADER_LEN as usize {
            return Err(DbpfError::TruncatedFile {
                expected: header::HEADER_LEN,
                found: bytes.len() as u64,
            });
        }

        let mut cursor = Cursor::new(bytes);
        let dbpf_header = DbpfHeader::read(&mut cursor).map_err(DbpfError::Binrw)?;

        if options.strict_header && !(dbpf_header.major_version == 1 && matches!(dbpf_header.minor_version, 0 | 1 | 2)) {
            return Err(DbpfError::UnsupportedVersion {
                major: dbpf_header.major_version,
                minor: dbpf_header.minor_version,
            });
        }

        if options.strict_header
            && !(dbpf_header.index_major_version == 7 && matches!(dbpf_header.index_minor_version, 0 | 1))
        {
            return Err(DbpfError::UnsupportedIndexVersion {
                major: dbpf_header.index_major_version,
                minor: dbpf_header.index_minor_version,
            });
        }

        let index_offset = dbpf_header.resolved_index_offset();
        let index_end = index_offset + (dbpf_header.index_entry_count as u64) * (dbpf_header.index_entry_len() as u64);
        if index_end > bytes.len() as u64 {
            return Err(DbpfError::IndexSizeMismatch {
                entry_count: dbpf_header.index_entry_count,
                expected: (dbpf_header.index_entry_count * dbpf_header.index_entry_len()) as u32,
                actual: dbpf_header.index_size,
            });
        }

        index::seek_to_index(&mut cursor, index_offset)?;
        let entries = index::read_index(&mut cursor, dbpf_header.index_entry_count, dbpf_header.index_minor_version >= 1)?;
        index::check_no_duplicates(&entries)?;

        debug!("parsed DBPF index: {} entries at offset {}", entries.len(), index_offset);

        let mut compression_dir = Vec::new();
        let mut found_dir = false;
        for entry in &entries {
            if compression_dir::is_compression_directory_key(&entry.key) {
                if found_dir {
                    return Err(DbpfError::DuplicateCompressionDirectory);
                }
                found_dir = true;
                let start = entry.offset as usize;
                let end = start + entry.file_size as usize;
                if end > bytes.len() {
                    return Err(DbpfError::TruncatedFile { expected: end as u64, found: bytes.len() as u64 });
                }
                compression_dir = compression_dir::parse_directory(
                    &mut Cursor::new(&bytes[start..end]),
                    dbpf_header.index_minor_version >= 1,
                )?;
            }
        }

        for cd_entry in &compression_dir {
            if !entries.iter().any(|e| cd_entry.matches(&e.key)) {
                return Err(DbpfError::SpuriousCompressionEntry);
            }
        }

        Ok(Package {
            backing,
            header: dbpf_header,
            entries,
            compression_dir,
            options,
        })
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn is_compressed(&self, key: &ResourceKey) -> bool {
        self.compression_dir.iter().any(|e| e.matches(key))
    }

    /// Returns the raw (possibly still QFS-compressed) on-disk bytes for a resource.
    pub fn raw_bytes(&self, key: &ResourceKey) -> Result<&[u8]> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.key == *key)
            .ok_or_else(|| DbpfError::PropertyNotFound(key.to_string()))?;
        let bytes = self.backing.as_slice();
        let start = entry.offset as usize;
        let end = start + entry.file_size as usize;
        if end > bytes.len() {
            return Err(DbpfError::TruncatedFile { expected: end as u64, found: bytes.len() as u64 });
        }
        Ok(&bytes[start..end])
    }

    /// Returns the decompressed bytes for a resource, transparently decoding QFS if
    /// the compression directory marks it as compressed.
    pub fn resource_bytes(&self, key: &ResourceKey) -> Result<Vec<u8>> {
        let raw = self.raw_bytes(key)?;
        if self.is_compressed(key) {
            let mut start_hint = 0usize;
            let decompressed_size = compression_dir::find_decompressed_size(&self.compression_dir, key, &mut start_hint)
                .ok_or_else(|| DbpfError::PropertyNotFound(format!("{key} missing from compression directory")))?;
            match qfs::decompress(raw, decompressed_size as usize, qfs::DecodeMode::Strict) {
                Ok(bytes) => Ok(bytes),
                Err(e) => {
                    warn!("failed to decode QFS payload for {key}: {e}");
                    Err(DbpfError::Qfs(e))
                }
            }
        } else {
            Ok(raw.to_vec())
        }
    }

    pub fn should_decode(&self, type_id: u32) -> bool {
        self.options.decode_types.is_empty() || self.options.decode_types.contains(&type_id)
    }
}

pub(crate) fn trace_qfs_refusal(reason: &str) {
    trace!("QFS refused to compress: {reason}");
}
