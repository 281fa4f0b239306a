//! STR# (and the compatible CATS/CTSS/TTA families): a 64-byte null-padded table
//! name, a format code, and a list of per-language text items, each a value string
//! and a description string.

use std::io::Read;

use crate::byte_stream::{read_u16_le, write_u16_le};
use crate::error::Result;

const NAME_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextItem {
    pub language_code: u8,
    pub value: String,
    pub description: String,
}

impl TextItem {
    /// The number of bytes this item adds to the resource: 1 language byte plus the
    /// two null-terminated strings (each string's length plus its terminator).
    pub fn byte_len(&self) -> usize {
        1 + self.value.len() + 1 + self.description.len() + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTable {
    pub table_name: String,
    pub format_code: u16,
    pub items: Vec<TextItem>,
}

fn read_name(reader: &mut impl Read) -> Result<String> {
    let mut buf = [0u8; NAME_LEN];
    reader.read_exact(&mut buf)?;
    let end = buf.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
    Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
}

fn write_name(out: &mut Vec<u8>, name: &str) {
    let mut buf = [0u8; NAME_LEN];
    let bytes = name.as_bytes();
    let len = bytes.len().min(NAME_LEN);
    buf[..len].copy_from_slice(&bytes[..len]);
    out.extend_from_slice(&buf);
}

impl StringTable {
    pub fn read(reader: &mut impl Read) -> Result<Self> {
        let table_name = read_name(reader)?;
        let format_code = read_u16_le(reader)?;
        let item_count = read_u16_le(reader)?;

        let mut items = Vec::with_capacity(item_count as usize);
        for _ in 0..item_count {
            let mut lang = [0u8; 1];
            reader.read_exact(&mut lang)?;
            let value = crate::byte_stream::read_cstring(reader)?;
            let description = crate::byte_stream::read_cstring(reader)?;
            items.push(TextItem { language_code: lang[0], value, description });
        }

        Ok(StringTable { table_name, format_code, items })
    }

    pub fn write_to_vec(&self, out: &mut Vec<u8>) {
        write_name(out, &self.table_name);
        write_u16_le(out, self.format_code);
        write_u16_le(out, self.items.len() as u16);
        for item in &self.items {
            out.push(item.language_code);
            crate::byte_stream::write_cstring(out, &item.value);
            crate::byte_stream::write_cstring(out, &item.description);
        }
    }

    pub fn add_text_item(&mut self, item: TextItem) {
        self.items.push(item);
    }

    pub fn remove_text_item(&mut self, index: usize) -> Option<TextItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn set_text_item(&mut self, index: usize, item: TextItem) -> Result<()> {
        if let Some(slot) = self.items.get_mut(index) {
            *slot = item;
            Ok(())
        } else {
            Err(crate::error::DbpfError::PropertyNotFound(format!("string table item {index}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_multiple_items() {
        let table = StringTable {
            table_name: "TextList".into(),
            format_code: 0x0001,
            items: vec![
                TextItem { language_code: 1, value: "Hello".into(), description: "greeting".into() },
                TextItem { language_code: 2, value: "Bonjour".into(), description: "greeting".into() },
            ],
        };
        let mut out = Vec::new();
        table.write_to_vec(&mut out);
        let parsed = StringTable::read(&mut Cursor::new(out)).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn name_longer_than_64_bytes_is_truncated() {
        let long_name = "x".repeat(100);
        let table = StringTable { table_name: long_name, format_code: 0, items: vec![] };
        let mut out = Vec::new();
        table.write_to_vec(&mut out);
        let parsed = StringTable::read(&mut Cursor::new(out)).unwrap();
        assert_eq!(parsed.table_name.len(), NAME_LEN);
    }

    #[test]
    fn remove_then_set_text_item() {
        let mut table = StringTable {
            table_name: "t".into(),
            format_code: 0,
            items: vec![
                TextItem { language_code: 0, value: "a".into(), description: "".into() },
                TextItem { language_code: 0, value: "b".into(), description: "".into() },
            ],
        };
        table.remove_text_item(0);
        assert_eq!(table.items.len(), 1);
        table.set_text_item(0, TextItem { language_code: 1, value: "c".into(), description: "".into() }).unwrap();
        assert_eq!(table.items[0].value, "c");
    }
}
