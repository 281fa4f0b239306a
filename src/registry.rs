//! The type-ID-to-short-name table used when listing or labelling resources. Sourced
//! from the set of resource kinds that appear across a typical Sims 2 package; kinds
//! this crate has no typed decoder for still get a name here, since naming a resource
//! doesn't require understanding its payload.

pub const TYPE_TXTR: u32 = 0x1C4A276C;
pub const TYPE_TXMT: u32 = 0x49596978;
pub const TYPE_DIR: u32 = 0xE86B1EEF;
pub const TYPE_GZPS: u32 = 0xEBCF3E27;
pub const TYPE_XHTN: u32 = 0x8C1580B5;
pub const TYPE_3IDR: u32 = 0xAC506764;
pub const TYPE_STRF: u32 = 0x53545223;
pub const TYPE_BINX: u32 = 0x0C900FDB;

const TABLE: &[(u32, &str)] = &[
    (TYPE_TXTR, "TXTR"),
    (TYPE_TXMT, "TXMT"),
    (TYPE_DIR, "DIR "),
    (TYPE_GZPS, "GZPS"),
    (TYPE_XHTN, "XHTN"),
    (TYPE_3IDR, "3IDR"),
    (TYPE_STRF, "STR#"),
    (TYPE_BINX, "BINX"),
    (0x25232b44, "CTSS"),
    (0x2a51171b, "TTAS"),
    (0x4857541a, "OBJD"),
    (0x4857541b, "OBJF"),
    (0x42434f4e, "BCON"),
    (0x42484156, "BHAV"),
    (0x43415453, "CATS"),
    (0x46414d49, "FAMI"),
    (0x46414d48, "FAMH"),
    (0x4e474248, "NGBH"),
    (0x4e524546, "NREF"),
    (0x02c96bfe, "SFX"),
    (0x5452414b, "TRKS"),
    (0xe519c933, "CRES"),
    (0x7ba3838c, "GMND"),
    (0xac4f8687, "GMDC"),
    (0xfc6eb1f7, "SHPE"),
    (0xed534136, "LIFO"),
    (0xc9c81b9b, "LGHT"),
    (0xfb00791e, "ANIM"),
    (0xd5f7f000, "CINE"),
];

/// The short display name for a resource type, or `None` if this crate doesn't
/// recognize the ID.
pub fn short_name(type_id: u32) -> Option<&'static str> {
    TABLE.iter().find(|(id, _)| *id == type_id).map(|(_, name)| *name)
}

/// The short name if known, otherwise an 8-hex-digit fallback label.
pub fn display_name(type_id: u32) -> String {
    short_name(type_id).map(str::to_string).unwrap_or_else(|| format!("{type_id:08X}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compression_directory_type_is_dir_not_clst() {
        assert_eq!(short_name(0xE86B1EEF), Some("DIR "));
    }

    #[test]
    fn unknown_type_falls_back_to_hex() {
        assert_eq!(display_name(0xDEADBEEF), "DEADBEEF");
    }
}
