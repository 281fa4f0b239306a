//! The hole table: a list of unused byte ranges left behind inside the package body
//! by in-place edits that shrank or removed a resource without compacting the file.
//! `PackageWriteOptions::preserve_holes` controls whether a write pass tries to reuse
//! these gaps instead of doing a full rewrite.

use std::io::{Read, Seek};

use crate::byte_stream::{read_u32_le, write_u32_le};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hole {
    pub offset: u32,
    pub size: u32,
}

pub fn read_holes(reader: &mut (impl Read + Seek), entry_count: u32) -> Result<Vec<Hole>> {
    let mut holes = Vec::with_capacity(entry_count as usize);
    for _ in 0..entry_count {
        let offset = read_u32_le(reader)?;
        let size = read_u32_le(reader)?;
        holes.push(Hole { offset, size });
    }
    Ok(holes)
}

pub fn write_holes(out: &mut Vec<u8>, holes: &[Hole]) {
    for hole in holes {
        write_u32_le(out, hole.offset);
        write_u32_le(out, hole.size);
    }
}

/// Merges adjacent and overlapping holes into a minimal sorted set, then finds the
/// smallest hole that fits `needed` bytes (best-fit), splitting off any leftover.
pub fn best_fit(holes: &mut Vec<Hole>, needed: u32) -> Option<u32> {
    holes.sort_by_key(|h| h.offset);
    let mut merged: Vec<Hole> = Vec::with_capacity(holes.len());
    for hole in holes.drain(..) {
        if let Some(last) = merged.last_mut() {
            if last.offset + last.size == hole.offset {
                last.size += hole.size;
                continue;
            }
        }
        merged.push(hole);
    }

    let best_idx = merged
        .iter()
        .enumerate()
        .filter(|(_, h)| h.size >= needed)
        .min_by_key(|(_, h)| h.size)
        .map(|(i, _)| i);

    let result = best_idx.map(|i| merged[i].offset);
    if let Some(i) = best_idx {
        if merged[i].size == needed {
            merged.remove(i);
        } else {
            merged[i].offset += needed;
            merged[i].size -= needed;
        }
    }
    *holes = merged;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_adjacent_holes_before_fitting() {
        let mut holes = vec![Hole { offset: 0, size: 10 }, Hole { offset: 10, size: 10 }];
        let offset = best_fit(&mut holes, 15);
        assert_eq!(offset, Some(0));
        assert_eq!(holes, vec![Hole { offset: 15, size: 5 }]);
    }

    #[test]
    fn picks_smallest_sufficient_hole() {
        let mut holes = vec![Hole { offset: 0, size: 100 }, Hole { offset: 200, size: 20 }];
        let offset = best_fit(&mut holes, 15);
        assert_eq!(offset, Some(200));
        assert_eq!(holes, vec![Hole { offset: 0, size: 100 }, Hole { offset: 215, size: 5 }]);
    }

    #[test]
    fn returns_none_when_no_hole_fits() {
        let mut holes = vec![Hole { offset: 0, size: 5 }];
        assert_eq!(best_fit(&mut holes, 15), None);
    }
}
