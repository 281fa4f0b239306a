//! `dbpf-rs` reads, edits, and writes DBPF package files — the container format used
//! to bundle game assets ("resources") identified by a type/group/instance key.
//!
//! With `dbpf-rs`, you can:
//!
//! - Open a package from disk (memory-mapped) or from an in-memory buffer and list
//!   or fetch the resources it contains.
//! - Transparently decompress QFS-compressed resource payloads, or compress new ones
//!   with the bundled encoder.
//! - Decode well-known resource kinds (materials, textures, property sets, string
//!   tables, reference tables, and more) into typed Rust values.
//! - Build a new package, or rewrite an existing one, through [`package::PackageBuilder`].

pub mod byte_stream;
pub mod error;
pub mod package;
pub mod qfs;
pub mod registry;
pub mod resource_handle;
pub mod resource_types;

pub use error::{DbpfError, Result};
pub use package::{Package, PackageOpenOptions, PackageWriteOptions};
