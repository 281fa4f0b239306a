//! Little-endian (and, in a few QFS- and property-bag-specific spots, big-endian)
//! byte-stream primitives shared by the package container and the typed resource layer.
//!
//! Readers advance a cursor over a borrowed byte slice; writers append to a `Vec<u8>`.
//! Short reads are errors (`UnexpectedEof`), matching the source's refusal to read past
//! the end of a resource's raw bytes.

use std::io::{self, Read};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

/// `cSGResource` framing record: a literal length-prefixed `"cSGResource"` tag, two
/// fixed little-endian words (0 and 2), then a 1-byte-length-prefixed user string.
pub const SCOPED_RESOURCE_TAG: &str = "cSGResource";

pub fn read_u32_le(cursor: &mut impl Read) -> io::Result<u32> {
    cursor.read_u32::<LittleEndian>()
}

pub fn read_u32_be(cursor: &mut impl Read) -> io::Result<u32> {
    cursor.read_u32::<BigEndian>()
}

pub fn read_u16_le(cursor: &mut impl Read) -> io::Result<u16> {
    cursor.read_u16::<LittleEndian>()
}

pub fn read_f32_le(cursor: &mut impl Read) -> io::Result<f32> {
    cursor.read_f32::<LittleEndian>()
}

pub fn read_f32_be(cursor: &mut impl Read) -> io::Result<f32> {
    cursor.read_f32::<BigEndian>()
}

pub fn write_u32_le(out: &mut Vec<u8>, value: u32) {
    out.write_u32::<LittleEndian>(value).expect("Vec writes never fail");
}

pub fn write_u32_be(out: &mut Vec<u8>, value: u32) {
    out.write_u32::<BigEndian>(value).expect("Vec writes never fail");
}

pub fn write_u16_le(out: &mut Vec<u8>, value: u16) {
    out.write_u16::<LittleEndian>(value).expect("Vec writes never fail");
}

pub fn write_f32_le(out: &mut Vec<u8>, value: f32) {
    out.write_f32::<LittleEndian>(value).expect("Vec writes never fail");
}

pub fn write_f32_be(out: &mut Vec<u8>, value: f32) {
    out.write_f32::<BigEndian>(value).expect("Vec writes never fail");
}

/// Reads a 1-byte-length-prefixed string.
pub fn read_pstring(cursor: &mut impl Read) -> io::Result<String> {
    let len = cursor.read_u8()? as usize;
    let mut buf = vec![0u8; len];
    cursor.read_exact(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Writes a 1-byte-length-prefixed string. Panics if longer than 255 bytes, matching
/// the source's implicit assumption (the length field is a single byte).
pub fn write_pstring(out: &mut Vec<u8>, s: &str) {
    assert!(s.len() <= u8::MAX as usize, "pstring too long: {} bytes", s.len());
    out.push(s.len() as u8);
    out.extend_from_slice(s.as_bytes());
}

/// Reads a 4-byte-length-prefixed string.
pub fn read_pstring32(cursor: &mut impl Read) -> io::Result<String> {
    let len = read_u32_le(cursor)? as usize;
    let mut buf = vec![0u8; len];
    cursor.read_exact(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn write_pstring32(out: &mut Vec<u8>, s: &str) {
    write_u32_le(out, s.len() as u32);
    out.extend_from_slice(s.as_bytes());
}

/// Reads a null-terminated string, bounded to 1024 bytes to guard against corrupt input
/// with no terminator.
pub fn read_cstring(cursor: &mut impl Read) -> io::Result<String> {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        if buf.len() >= 1024 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "null-terminated string exceeds 1024-byte bound",
            ));
        }
        cursor.read_exact(&mut byte)?;
        if byte[0] == 0 {
            break;
        }
        buf.push(byte[0]);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn write_cstring(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(s.as_bytes());
    out.push(0);
}

/// Reads the `cSGResource` scoped-name record: the literal tag (length-prefixed), two
/// fixed little-endian words (0 and 2), then a 1-byte-length-prefixed user string.
pub fn read_scoped_resource_name(cursor: &mut impl Read) -> io::Result<String> {
    let tag = read_pstring(cursor)?;
    if tag != SCOPED_RESOURCE_TAG {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("expected cSGResource tag, got {tag:?}"),
        ));
    }
    let _word0 = read_u32_le(cursor)?;
    let _word2 = read_u32_le(cursor)?;
    read_pstring(cursor)
}

pub fn write_scoped_resource_name(out: &mut Vec<u8>, name: &str) {
    write_pstring(out, SCOPED_RESOURCE_TAG);
    write_u32_le(out, 0);
    write_u32_le(out, 2);
    write_pstring(out, name);
}
