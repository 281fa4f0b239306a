use std::io;
use thiserror::Error;

use crate::qfs::QfsError;

/// Crate-wide error type. One variant family per failing subsystem, mirroring the
/// separation between container parsing, codec decode/encode, and typed-resource access.
#[derive(Debug, Error)]
pub enum DbpfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("binary layout error: {0}")]
    Binrw(#[from] binrw::Error),

    #[error("QFS codec error: {0}")]
    Qfs(#[from] QfsError),

    #[error("bad magic: expected \"DBPF\"")]
    BadMagic,

    #[error("unsupported DBPF version: major={major}, minor={minor}")]
    UnsupportedVersion { major: u32, minor: u32 },

    #[error("unsupported index version: major={major}, minor={minor}")]
    UnsupportedIndexVersion { major: u32, minor: u32 },

    #[error("file is truncated: expected at least {expected} bytes, found {found}")]
    TruncatedFile { expected: u64, found: u64 },

    #[error("index size mismatch: entry_count={entry_count} implies {expected} bytes, header says {actual}")]
    IndexSizeMismatch {
        entry_count: u32,
        expected: u32,
        actual: u32,
    },

    #[error("package has more than one compression directory")]
    DuplicateCompressionDirectory,

    #[error("compression directory references a resource key not present in the primary index")]
    SpuriousCompressionEntry,

    #[error("duplicate resource key in primary index: {0:?}")]
    DuplicateIndexKey(crate::package::index::ResourceKey),

    #[error("resource type mismatch: {0}")]
    ResourceTypeMismatch(String),

    #[error("property not found: {0}")]
    PropertyNotFound(String),

    #[error("property type mismatch for {name}: expected {expected}, got {actual}")]
    PropertyTypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("allocation failure: {0}")]
    AllocationFailure(String),
}

pub type Result<T> = std::result::Result<T, DbpfError>;
