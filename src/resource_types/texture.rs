//! TXTR: a texture resource. Opens with the same link header as TXMT (RCOL's list of
//! the LIFO resources holding the compressed pixel data for each mip level), followed
//! by the `cImageData` block header, dimensions, pixel format, and mipmap layout. The
//! remainder of the resource is the raw pixel bytes themselves, handed back opaque
//! since decoding DXT/raw pixel data is outside what this crate's resource layer does.

use std::io::Read;

use crate::byte_stream::{read_scoped_resource_name, read_u32_le, write_scoped_resource_name, write_u32_le};
use crate::error::{DbpfError, Result};
use crate::resource_types::link_header::LinkHeader;

pub const BLOCK_NAME: &str = "cImageData";
pub const BLOCK_ID: u32 = 0x1C4A276C;

/// A file description string was added to the block in version 9; earlier textures
/// have none.
const DESCRIPTION_MIN_VERSION: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    RawArgb,
    RawRgb,
    Alpha8,
    Dxt1,
    Dxt3,
    RawGreyscale,
    Alt32Bit,
    Dxt5,
    Alt24Bit,
    Unknown(u32),
}

impl PixelFormat {
    fn from_code(code: u32) -> Self {
        match code {
            1 => PixelFormat::RawArgb,
            2 => PixelFormat::RawRgb,
            3 => PixelFormat::Alpha8,
            4 => PixelFormat::Dxt1,
            5 => PixelFormat::Dxt3,
            6 => PixelFormat::RawGreyscale,
            7 => PixelFormat::Alt32Bit,
            8 => PixelFormat::Dxt5,
            9 => PixelFormat::Alt24Bit,
            other => PixelFormat::Unknown(other),
        }
    }

    fn to_code(self) -> u32 {
        match self {
            PixelFormat::RawArgb => 1,
            PixelFormat::RawRgb => 2,
            PixelFormat::Alpha8 => 3,
            PixelFormat::Dxt1 => 4,
            PixelFormat::Dxt3 => 5,
            PixelFormat::RawGreyscale => 6,
            PixelFormat::Alt32Bit => 7,
            PixelFormat::Dxt5 => 8,
            PixelFormat::Alt24Bit => 9,
            PixelFormat::Unknown(code) => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub links: LinkHeader,
    pub block_version: u32,
    pub texture_name: String,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub mipmap_code: u32,
    /// 1 = object, 2 = outfit, 3 = UI; any other value is preserved but unrecognized.
    pub purpose: f32,
    pub outer_loop_count: u32,
    pub description: String,
    /// Everything after the header: the compressed or raw pixel payload. Opaque to
    /// this crate.
    pub image_data: Vec<u8>,
}

impl Texture {
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

        let texture_name = read_scoped_resource_name(reader)?;
        let width = read_u32_le(reader)?;
        let height = read_u32_le(reader)?;
        let format = PixelFormat::from_code(read_u32_le(reader)?);
        let mipmap_code = read_u32_le(reader)?;
        let purpose = f32::from_bits(read_u32_le(reader)?);
        let outer_loop_count = read_u32_le(reader)?;
        let _reserved = read_u32_le(reader)?;

        let description = if block_version == DESCRIPTION_MIN_VERSION {
            crate::byte_stream::read_pstring(reader)?
        } else {
            String::new()
        };

        let mut image_data = Vec::new();
        reader.read_to_end(&mut image_data)?;

        Ok(Texture {
            links,
            block_version,
            texture_name,
            width,
            height,
            format,
            mipmap_code,
            purpose,
            outer_loop_count,
            description,
            image_data,
        })
    }

    /// True iff `self` and `other` depict the same image: same format, same
    /// dimensions, and byte-for-byte identical pixel data.
    pub fn equal_image_as(&self, other: &Texture) -> bool {
        self.format == other.format
            && self.width == other.width
            && self.height == other.height
            && self.image_data == other.image_data
    }

    pub fn write_to_vec(&self, out: &mut Vec<u8>) {
        self.links.write_to_vec(out);
        crate::byte_stream::write_pstring(out, BLOCK_NAME);
        write_u32_le(out, BLOCK_ID);
        write_u32_le(out, self.block_version);
        write_scoped_resource_name(out, &self.texture_name);
        write_u32_le(out, self.width);
        write_u32_le(out, self.height);
        write_u32_le(out, self.format.to_code());
        write_u32_le(out, self.mipmap_code);
        write_u32_le(out, self.purpose.to_bits());
        write_u32_le(out, self.outer_loop_count);
        write_u32_le(out, 0);

        if self.block_version == DESCRIPTION_MIN_VERSION {
            crate::byte_stream::write_pstring(out, &self.description);
        }

        out.extend_from_slice(&self.image_data);
    }
}
