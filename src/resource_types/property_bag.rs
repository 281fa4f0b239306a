//! The two flavors of property bag used throughout the typed resource layer: a plain
//! string-to-string map (used for simpler key/value resources) and a tagged-value map
//! where each value carries a type sentinel (used by CPF-framed resources like GZPS
//! and XHTN). Both preserve insertion order, matching how the game itself round-trips
//! unmodified bags byte-for-byte.

use std::io::Read;

use indexmap::IndexMap;

use crate::byte_stream::{
    read_f32_be, read_pstring, read_pstring32, read_u16_le, read_u32_le, write_f32_be, write_pstring, write_pstring32,
    write_u16_le, write_u32_le,
};
use crate::error::{DbpfError, Result};

/// Header magic for a tagged-value (CPF) property bag.
pub const CPF_MAGIC: u32 = 0xCBE750E0;
pub const CPF_FORMAT_VERSION: u16 = 2;

pub const TAG_BOOL: u32 = 0xCBA908E1;
pub const TAG_UINT: u32 = 0xEB61E4F7;
pub const TAG_INT: u32 = 0x0C264712;
pub const TAG_FLOAT: u32 = 0xABC78708;
pub const TAG_STRING: u32 = 0x0B8BEA18;

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    UInt(u32),
    Int(i32),
    Float(f32),
    Str(String),
}

impl PropertyValue {
    pub fn tag(&self) -> u32 {
        match self {
            PropertyValue::Bool(_) => TAG_BOOL,
            PropertyValue::UInt(_) => TAG_UINT,
            PropertyValue::Int(_) => TAG_INT,
            PropertyValue::Float(_) => TAG_FLOAT,
            PropertyValue::Str(_) => TAG_STRING,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "bool",
            PropertyValue::UInt(_) => "uint",
            PropertyValue::Int(_) => "int",
            PropertyValue::Float(_) => "float",
            PropertyValue::Str(_) => "string",
        }
    }

    pub fn as_float(&self) -> Result<f32> {
        match self {
            PropertyValue::Float(v) => Ok(*v),
            other => Err(type_mismatch("<value>", "float", other.type_name())),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            PropertyValue::Str(v) => Ok(v),
            other => Err(type_mismatch("<value>", "string", other.type_name())),
        }
    }
}

fn type_mismatch(name: &str, expected: &'static str, actual: &'static str) -> DbpfError {
    DbpfError::PropertyTypeMismatch { name: name.to_string(), expected, actual }
}

/// A plain string-keyed, string-valued property map, wire-compatible with resources
/// that have no per-value type tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringBag {
    pub entries: IndexMap<String, String>,
}

impl StringBag {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Inserts `key`/`value` only if `key` isn't already present. Returns whether it
    /// was inserted.
    pub fn add_pair(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        use indexmap::map::Entry;
        match self.entries.entry(key.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value.into());
                true
            }
        }
    }

    /// Unconditionally sets `key` to `value`. Returns `(found, size_delta_bytes)`:
    /// `found` is whether `key` already existed, and `size_delta_bytes` is
    /// `len(new) - len(old)` (or `len(new)` for a brand new key).
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> (bool, i64) {
        let key = key.into();
        let value = value.into();
        match self.entries.get(&key) {
            Some(old) if *old == value => (true, 0),
            Some(old) => {
                let delta = value.len() as i64 - old.len() as i64;
                self.entries.insert(key, value);
                (true, delta)
            }
            None => {
                let delta = value.len() as i64;
                self.entries.insert(key, value);
                (false, delta)
            }
        }
    }

    pub fn read(reader: &mut impl Read, count: u32) -> Result<Self> {
        let mut entries = IndexMap::with_capacity(count as usize);
        for _ in 0..count {
            let key = read_pstring(reader)?;
            let value = read_pstring32(reader)?;
            entries.insert(key, value);
        }
        Ok(StringBag { entries })
    }

    pub fn write_to_vec(&self, out: &mut Vec<u8>) {
        for (key, value) in &self.entries {
            write_pstring(out, key);
            write_pstring32(out, value);
        }
    }
}

/// The result of [`TaggedValueBag::set`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetOutcome {
    /// The key didn't exist yet; it was inserted.
    Inserted,
    /// The key existed with the same value; nothing changed.
    Unchanged,
    /// The key existed with a different value of the same tag; it was updated.
    /// `size_delta` is nonzero only for string-kind values (fixed-width values
    /// never change the resource's on-wire size).
    Updated { size_delta: i64 },
    /// The key existed with a value of a different tag; rejected, unchanged.
    TypeMismatch,
}

/// A tagged-value property bag: the CPF format used by material definitions,
/// property sets, and similar resources. Every value's wire form starts with a
/// 4-byte type sentinel identifying one of five primitive kinds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaggedValueBag {
    pub entries: IndexMap<String, PropertyValue>,
}

impl TaggedValueBag {
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.get(key)
    }

    pub fn require(&self, key: &str) -> Result<&PropertyValue> {
        self.entries.get(key).ok_or_else(|| DbpfError::PropertyNotFound(key.to_string()))
    }

    /// Inserts or updates `key` unconditionally, bypassing the type-mismatch check
    /// `set` enforces. Used by callers (like `BinaryIndex::set_sort_index`) that have
    /// already decided which tag to write.
    pub fn force_set(&mut self, key: impl Into<String>, value: PropertyValue) {
        self.entries.insert(key.into(), value);
    }

    /// Sets `key` to `value`, rejecting a tag change against an existing entry.
    pub fn set(&mut self, key: impl Into<String>, value: PropertyValue) -> SetOutcome {
        let key = key.into();
        match self.entries.get(&key) {
            Some(old) if *old == value => SetOutcome::Unchanged,
            Some(old) if old.tag() != value.tag() => SetOutcome::TypeMismatch,
            Some(old) => {
                let size_delta = match (old, &value) {
                    (PropertyValue::Str(old), PropertyValue::Str(new)) => new.len() as i64 - old.len() as i64,
                    _ => 0,
                };
                self.entries.insert(key, value);
                SetOutcome::Updated { size_delta }
            }
            None => {
                self.entries.insert(key, value);
                SetOutcome::Inserted
            }
        }
    }

    /// The tag currently associated with `key`, if present. Used by callers like
    /// `BinaryIndex::set_sort_index` that must preserve an existing value's tag
    /// instead of forcing one.
    pub fn tag_of(&self, key: &str) -> Option<u32> {
        self.entries.get(key).map(PropertyValue::tag)
    }

    pub fn read(reader: &mut impl Read) -> Result<Self> {
        let magic = read_u32_le(reader)?;
        if magic != CPF_MAGIC {
            return Err(DbpfError::ResourceTypeMismatch(format!(
                "expected CPF magic {CPF_MAGIC:#010X}, found {magic:#010X}"
            )));
        }
        let _format_version = read_u16_le(reader)?;
        let count = read_u32_le(reader)?;

        let mut entries = IndexMap::with_capacity(count as usize);
        for _ in 0..count {
            let tag = read_u32_le(reader)?;
            let name = read_pstring32(reader)?;
            let value = match tag {
                TAG_BOOL => {
                    let mut b = [0u8; 1];
                    reader.read_exact(&mut b)?;
                    PropertyValue::Bool(b[0] != 0)
                }
                TAG_UINT => PropertyValue::UInt(read_u32_le(reader)?),
                TAG_INT => PropertyValue::Int(read_u32_le(reader)? as i32),
                TAG_FLOAT => PropertyValue::Float(read_f32_be(reader)?),
                TAG_STRING => PropertyValue::Str(read_pstring32(reader)?),
                other => {
                    return Err(DbpfError::ResourceTypeMismatch(format!("unknown property tag {other:#010X}")));
                }
            };
            entries.insert(name, value);
        }

        Ok(TaggedValueBag { entries })
    }

    pub fn write_to_vec(&self, out: &mut Vec<u8>) {
        write_u32_le(out, CPF_MAGIC);
        write_u16_le(out, CPF_FORMAT_VERSION);
        write_u32_le(out, self.entries.len() as u32);
        for (name, value) in &self.entries {
            write_u32_le(out, value.tag());
            write_pstring32(out, name);
            match value {
                PropertyValue::Bool(b) => out.push(*b as u8),
                PropertyValue::UInt(v) => write_u32_le(out, *v),
                PropertyValue::Int(v) => write_u32_le(out, *v as u32),
                PropertyValue::Float(v) => write_f32_be(out, *v),
                PropertyValue::Str(s) => write_pstring32(out, s),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn tagged_value_bag_round_trips_all_variants() {
        let mut bag = TaggedValueBag::default();
        bag.set("enabled", PropertyValue::Bool(true));
        bag.set("count", PropertyValue::UInt(42));
        bag.set("offset", PropertyValue::Int(-7));
        bag.set("scale", PropertyValue::Float(1.5));
        bag.set("name", PropertyValue::Str("hello".into()));

        let mut out = Vec::new();
        bag.write_to_vec(&mut out);

        let parsed = TaggedValueBag::read(&mut Cursor::new(out)).unwrap();
        assert_eq!(parsed, bag);
    }

    #[test]
    fn tag_of_reflects_existing_value_kind() {
        let mut bag = TaggedValueBag::default();
        bag.set("sortindex", PropertyValue::Int(3));
        assert_eq!(bag.tag_of("sortindex"), Some(TAG_INT));
        assert_eq!(bag.tag_of("missing"), None);
    }

    #[test]
    fn string_bag_round_trips() {
        let mut bag = StringBag::default();
        bag.set("key1", "value1");
        bag.set("key2", "value2");

        let mut out = Vec::new();
        bag.write_to_vec(&mut out);
        let parsed = StringBag::read(&mut Cursor::new(out), bag.entries.len() as u32).unwrap();
        assert_eq!(parsed, bag);
    }
}
