//! TXMT: a material definition. Carries a link header (the textures and shaders this
//! material references), a scoped material name, a description, a material-type
//! string, a tagged-value property bag, and — for newer block versions — an explicit
//! list of texture names.

use std::io::Read;

use crate::byte_stream::{read_scoped_resource_name, read_u32_le, write_scoped_resource_name, write_u32_le};
use crate::error::{DbpfError, Result};
use crate::resource_types::link_header::LinkHeader;
use crate::resource_types::property_bag::TaggedValueBag;

pub const BLOCK_NAME: &str = "cMaterialDefinition";
pub const BLOCK_ID: u32 = 0x49596978;

/// Texture names were added to the block in version 9; earlier material definitions
/// have none.
const TEXTURE_NAMES_MIN_VERSION: u32 = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub links: LinkHeader,
    pub block_version: u32,
    pub material_name: String,
    pub description: String,
    pub material_type: String,
    pub properties: TaggedValueBag,
    pub texture_names: Vec<String>,
}

impl Material {
    pub fn read(reader: &mut impl Read) -> Result<Self> {
        let links = LinkHeader::read(reader)?;

        let block_name = crate::byte_stream::read_pstring(reader)?;
        if block_name != BLOCK_NAME {
            return Err(DbpfError::ResourceTypeMismatch(format!(
                "expected block name {BLOCK_NAME:?}, found {block_name:?}"
            )));
        }
        let block_id = read_u32_le(reader)?;
        if block_id != BLOCK_ID {
            return Err(DbpfError::ResourceTypeMismatch(format!(
                "expected block id {BLOCK_ID:#010X}, found {block_id:#010X}"
            )));
        }
        let block_version = read_u32_le(reader)?;

        let material_name = read_scoped_resource_name(reader)?;
        let description = crate::byte_stream::read_pstring32(reader)?;
        let material_type = crate::byte_stream::read_pstring32(reader)?;

        let property_count = read_u32_le(reader)?;
        let mut entries = indexmap::IndexMap::with_capacity(property_count as usize);
        for _ in 0..property_count {
            let key = crate::byte_stream::read_pstring32(reader)?;
            let value = crate::byte_stream::read_pstring32(reader)?;
            entries.insert(key, crate::resource_types::property_bag::PropertyValue::Str(value));
        }

        let mut texture_names = Vec::new();
        if block_version > TEXTURE_NAMES_MIN_VERSION {
            let texture_name_count = read_u32_le(reader)?;
            for _ in 0..texture_name_count {
                texture_names.push(crate::byte_stream::read_pstring32(reader)?);
            }
        }

        Ok(Material {
            links,
            block_version,
            material_name,
            description,
            material_type,
            properties: TaggedValueBag { entries },
            texture_names,
        })
    }

    /// Strips the `##0x12345678!` prefix and `~stdMatBaseTextureName` suffix from the
    /// `stdMatBaseTextureName` property, returning the subset name in between.
    pub fn get_subset_name(&self) -> Option<String> {
        const PREFIX_LEN: usize = 13;
        const SUFFIX_LEN: usize = 22;

        let value = self.properties.get("stdMatBaseTextureName")?.as_str().ok()?;
        if value.len() < PREFIX_LEN + SUFFIX_LEN {
            return None;
        }
        Some(value[PREFIX_LEN..value.len() - SUFFIX_LEN].to_string())
    }

    pub fn write_to_vec(&self, out: &mut Vec<u8>) {
        self.links.write_to_vec(out);
        crate::byte_stream::write_pstring(out, BLOCK_NAME);
        write_u32_le(out, BLOCK_ID);
        write_u32_le(out, self.block_version);
        write_scoped_resource_name(out, &self.material_name);
        crate::byte_stream::write_pstring32(out, &self.description);
        crate::byte_stream::write_pstring32(out, &self.material_type);

        write_u32_le(out, self.properties.entries.len() as u32);
        for (key, value) in &self.properties.entries {
            crate::byte_stream::write_pstring32(out, key);
            let as_str = match value {
                crate::resource_types::property_bag::PropertyValue::Str(s) => s.clone(),
                other => format!("{other:?}"),
            };
            crate::byte_stream::write_pstring32(out, &as_str);
        }

        if self.block_version > TEXTURE_NAMES_MIN_VERSION {
            write_u32_le(out, self.texture_names.len() as u32);
            for name in &self.texture_names {
                crate::byte_stream::write_pstring32(out, name);
            }
        }
    }
}
