//! BINX: a small CPF-framed resource carrying a sort index used to order UI-visible
//! items (careers, skills, and similar catalog entries).

use std::io::Read;

use crate::error::Result;
use crate::resource_types::property_bag::{PropertyValue, TaggedValueBag, TAG_INT, TAG_UINT};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BinaryIndex {
    pub properties: TaggedValueBag,
}

impl BinaryIndex {
    pub fn read(reader: &mut impl Read) -> Result<Self> {
        Ok(BinaryIndex { properties: TaggedValueBag::read(reader)? })
    }

    pub fn write_to_vec(&self, out: &mut Vec<u8>) {
        self.properties.write_to_vec(out)
    }

    pub fn sort_index(&self) -> Option<i64> {
        match self.properties.get("sortindex") {
            Some(PropertyValue::Int(v)) => Some(*v as i64),
            Some(PropertyValue::UInt(v)) => Some(*v as i64),
            _ => None,
        }
    }

    /// Writes `sortindex` using whatever tag the property already has (`int` or
    /// `uint`), defaulting to `int` when the property doesn't exist yet.
    pub fn set_sort_index(&mut self, index: i32) {
        let tag = self.properties.tag_of("sortindex").unwrap_or(TAG_INT);
        let value = if tag == TAG_UINT { PropertyValue::UInt(index as u32) } else { PropertyValue::Int(index) };
        self.properties.set("sortindex", value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_int_tag_when_absent() {
        let mut binx = BinaryIndex::default();
        binx.set_sort_index(5);
        assert_eq!(binx.properties.tag_of("sortindex"), Some(TAG_INT));
        assert_eq!(binx.sort_index(), Some(5));
    }

    #[test]
    fn preserves_existing_uint_tag() {
        let mut binx = BinaryIndex::default();
        binx.properties.set("sortindex", PropertyValue::UInt(1));
        binx.set_sort_index(7);
        assert_eq!(binx.properties.tag_of("sortindex"), Some(TAG_UINT));
        assert_eq!(binx.sort_index(), Some(7));
    }
}
