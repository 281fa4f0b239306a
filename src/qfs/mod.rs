//! QFS: the LZ77-family compression framing used inside DBPF resource payloads.
//!
//! A QFS frame is a 9-byte header (compressed length, a fixed sentinel compression ID,
//! big-endian decompressed length) followed by an opcode stream. See [`decode`] for the
//! decompressor and [`encode`] for the chained-hash compressor.

mod decode;
mod encode;

pub use decode::{decompress, DecodeMode};
pub use encode::{compress, try_compress};

use thiserror::Error;

/// Sentinel compression ID stored in every QFS frame header.
pub const COMPRESSION_ID: u16 = 0xFB10;

/// 9-byte QFS frame header.
pub const HEADER_LEN: usize = 9;

/// Inspects a buffer's leading 9 bytes for a QFS frame header without decompressing
/// anything, returning `(compressed_size, decompressed_size)` from the header fields
/// if the sentinel matches.
pub fn peek_header(bytes: &[u8]) -> Option<(u32, u32)> {
    if bytes.len() < HEADER_LEN + 1 {
        return None;
    }
    let compression_id = u16::from_le_bytes([bytes[4], bytes[5]]);
    if compression_id != COMPRESSION_ID {
        return None;
    }
    let compressed_size = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let decompressed_size = ((bytes[6] as u32) << 16) | ((bytes[7] as u32) << 8) | (bytes[8] as u32);
    Some((compressed_size, decompressed_size))
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QfsError {
    #[error("invalid QFS frame header")]
    InvalidHeader,

    #[error("header length does not match caller-supplied size")]
    LengthMismatch,

    #[error("opcode stream is truncated")]
    TruncatedInput,

    #[error("back-reference offset exceeds current output position")]
    InvalidBackReference,

    #[error("decoded output would exceed the declared window")]
    OverrunOutput,
}
