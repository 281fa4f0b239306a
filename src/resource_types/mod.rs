//! Typed decoders for the resource kinds this crate understands, layered on top of
//! the raw container bytes `Package` hands out. Every type here accepts arbitrary
//! byte content and decodes it independently of where it lives in a package; nothing
//! in this module reads the index or the compression directory.

pub mod binary_index;
pub mod hair_tone;
pub mod link_header;
pub mod material;
pub mod property_bag;
pub mod property_set;
pub mod reference_table;
pub mod string_table;
pub mod texture;

use crate::error::Result;
use crate::registry;

/// A typed resource decoded from a raw byte buffer. Implementors don't retain the
/// original bytes; callers that need to re-encode call `write_to_vec` on the
/// concrete type directly, since the set of operations differs per kind.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedResource {
    Material(material::Material),
    Texture(texture::Texture),
    ReferenceTable(reference_table::ReferenceTable),
    StringTable(string_table::StringTable),
    PropertySet(property_set::PropertySet),
    HairTone(hair_tone::HairTone),
    BinaryIndex(binary_index::BinaryIndex),
}

/// Decodes `bytes` according to `type_id`, if this crate has a typed decoder for it.
/// Unrecognized type IDs are not an error here — callers fall back to treating the
/// resource as opaque bytes, using [`registry::short_name`] only to label it.
pub fn decode(type_id: u32, bytes: &[u8]) -> Result<Option<TypedResource>> {
    use std::io::Cursor;
    let mut reader = Cursor::new(bytes);

    let resource = match type_id {
        registry::TYPE_TXMT => TypedResource::Material(material::Material::read(&mut reader)?),
        registry::TYPE_TXTR => TypedResource::Texture(texture::Texture::read(&mut reader)?),
        registry::TYPE_3IDR => TypedResource::ReferenceTable(reference_table::ReferenceTable::read(&mut reader)?),
        registry::TYPE_STRF => TypedResource::StringTable(string_table::StringTable::read(&mut reader)?),
        registry::TYPE_GZPS => TypedResource::PropertySet(property_set::PropertySet::read(&mut reader)?),
        registry::TYPE_XHTN => TypedResource::HairTone(hair_tone::HairTone::read(&mut reader)?),
        registry::TYPE_BINX => TypedResource::BinaryIndex(binary_index::BinaryIndex::read(&mut reader)?),
        _ => return Ok(None),
    };

    Ok(Some(resource))
}
