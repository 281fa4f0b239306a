//! The 96-byte DBPF file header: magic, format version, and the location of the
//! primary index and hole (free-space) tables.

use binrw::binrw;

pub const MAGIC: [u8; 4] = *b"DBPF";
pub const HEADER_LEN: u64 = 96;

#[binrw]
#[brw(little, magic = b"DBPF")]
#[derive(Debug, Clone)]
pub struct DbpfHeader {
    pub major_version: u32,
    /// Stored on the wire as `minor_version + 1`; this field holds the logical value.
    #[br(map = |x: u32| x.wrapping_sub(1))]
    #[bw(map = |x: &u32| x.wrapping_add(1))]
    pub minor_version: u32,
    pub major_user_version: u32,
    pub minor_user_version: u32,
    pub flags: u32,
    pub date_created: u32,
    pub date_modified: u32,
    pub index_major_version: u32,
    pub index_entry_count: u32,
    pub index_offset: u32,
    pub index_size: u32,
    pub hole_entry_count: u32,
    pub hole_offset: u32,
    pub hole_size: u32,
    /// Stored on the wire as `index_minor_version + 1`; this field holds the logical value.
    #[br(map = |x: u32| x.wrapping_sub(1))]
    #[bw(map = |x: &u32| x.wrapping_add(1))]
    pub index_minor_version: u32,
    pub index_offset_v2: u32,
    #[br(pad_after = 24)]
    #[bw(pad_after = 24)]
    pub unused: u32,
}

impl DbpfHeader {
    /// The offset of the primary index, accounting for the minor-version-dependent
    /// second offset field: packages with `index_minor_version >= 1` store the real
    /// offset in `index_offset_v2` and leave `index_offset` stale.
    pub fn resolved_index_offset(&self) -> u64 {
        if self.index_minor_version >= 1 && self.index_offset_v2 != 0 {
            self.index_offset_v2 as u64
        } else {
            self.index_offset as u64
        }
    }

    /// The byte width of each primary index record: 20 bytes for minor version 0
    /// (group/instance/type/offset/size, no resource-ID field), 24 bytes for minor
    /// version 1 (adds the `resource` field to the key).
    pub fn index_entry_len(&self) -> u32 {
        if self.index_minor_version >= 1 {
            24
        } else {
            20
        }
    }
}

impl Default for DbpfHeader {
    fn default() -> Self {
        DbpfHeader {
            major_version: 1,
            minor_version: 1,
            major_user_version: 0,
            minor_user_version: 0,
            flags: 0,
            date_created: 0,
            date_modified: 0,
            index_major_version: 7,
            index_entry_count: 0,
            index_offset: 0,
            index_size: 0,
            hole_entry_count: 0,
            hole_offset: 0,
            hole_size: 0,
            index_minor_version: 1,
            index_offset_v2: 0,
            unused: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binrw::{BinRead, BinWrite};
    use std::io::Cursor;

    #[test]
    fn header_round_trips_and_is_96_bytes() {
        let header = DbpfHeader {
            index_entry_count: 3,
            index_offset_v2: 96,
            ..Default::default()
        };
        let mut buf = Cursor::new(Vec::new());
        header.write(&mut buf).unwrap();
        assert_eq!(buf.get_ref().len() as u64, HEADER_LEN);

        buf.set_position(0);
        let parsed = DbpfHeader::read(&mut buf).unwrap();
        assert_eq!(parsed.index_entry_count, 3);
        assert_eq!(parsed.resolved_index_offset(), 96);
    }

    #[test]
    fn minor_version_selects_entry_width() {
        let mut h = DbpfHeader { index_minor_version: 0, ..Default::default() };
        assert_eq!(h.index_entry_len(), 20);
        h.index_minor_version = 1;
        assert_eq!(h.index_entry_len(), 24);
    }

    #[test]
    fn minor_version_is_stored_on_the_wire_as_plus_one() {
        let header = DbpfHeader { minor_version: 1, index_minor_version: 1, ..Default::default() };
        let mut buf = Cursor::new(Vec::new());
        header.write(&mut buf).unwrap();
        let bytes = buf.into_inner();
        assert_eq!(u32::from_le_bytes(bytes[8..12].try_into().unwrap()), 2);
        assert_eq!(u32::from_le_bytes(bytes[60..64].try_into().unwrap()), 2);
    }

    #[test]
    fn parses_literal_header_with_zero_entries() {
        // Scenario: "DBPF", major=1, minor+1=2 (logical minor=1), 12 zero reserved
        // bytes, zeroed timestamps, index major=7, index minor+1=2, zero entries,
        // index offset 96, index size 0, the rest zeroed out to 96 bytes.
        let mut bytes = vec![0u8; HEADER_LEN as usize];
        bytes[0..4].copy_from_slice(b"DBPF");
        bytes[4..8].copy_from_slice(&1u32.to_le_bytes()); // major
        bytes[8..12].copy_from_slice(&2u32.to_le_bytes()); // minor+1
        bytes[32..36].copy_from_slice(&7u32.to_le_bytes()); // index major
        bytes[36..40].copy_from_slice(&0u32.to_le_bytes()); // entry count
        bytes[40..44].copy_from_slice(&96u32.to_le_bytes()); // index offset
        bytes[44..48].copy_from_slice(&0u32.to_le_bytes()); // index size
        bytes[60..64].copy_from_slice(&2u32.to_le_bytes()); // index minor+1

        let parsed = DbpfHeader::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(parsed.minor_version, 1);
        assert_eq!(parsed.index_minor_version, 1);
        assert_eq!(parsed.index_entry_count, 0);
    }
}
