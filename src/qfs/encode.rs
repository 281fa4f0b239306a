//! Chained-hash LZ77 compressor, adapted from zlib's `deflate_slow` lazy-matching
//! strategy to the QFS opcode set. Produces output that the decoder in [`super::decode`]
//! can losslessly invert; does not attempt to match any particular reference encoder
//! byte-for-byte, only to be a correct and reasonably tight QFS encoder.

use super::{COMPRESSION_ID, HEADER_LEN};

const MAX_MATCH: usize = 1028;
const MIN_MATCH: usize = 3;
const MIN_LOOKAHEAD: usize = MAX_MATCH + MIN_MATCH + 1;
const GOOD_LENGTH: usize = 32;
const MAX_LAZY: usize = 258;
const NICE_LENGTH: usize = 258;
const MAX_CHAIN: usize = 4096;
const HASH_SIZE: usize = 65536;
const HASH_MASK: u32 = 65535;
const HASH_SHIFT: u32 = 6;
const W_SIZE: usize = 131072;
const MAX_DIST: usize = W_SIZE;
const W_MASK: usize = W_SIZE - 1;

/// Minimum input length the encoder will attempt to compress, and the size beyond
/// which QFS's 3-byte decompressed-size field can no longer represent the result.
const MIN_COMPRESS_LEN: usize = 14;
const MAX_COMPRESS_LEN: usize = 16_777_216;

struct Hash {
    head: Vec<i32>,
    prev: Vec<i32>,
    hash: u32,
}

impl Hash {
    fn new() -> Self {
        Hash {
            head: vec![-1; HASH_SIZE],
            prev: vec![-1; W_SIZE],
            hash: 0,
        }
    }

    fn update(&mut self, c: u8) {
        self.hash = ((self.hash << HASH_SHIFT) ^ c as u32) & HASH_MASK;
    }

    fn getprev(&self, pos: i32) -> i32 {
        self.prev[pos as usize & W_MASK]
    }

    fn insert(&mut self, pos: usize) -> i32 {
        let match_head = self.head[self.hash as usize];
        self.prev[pos & W_MASK] = match_head;
        self.head[self.hash as usize] = pos as i32;
        match_head
    }
}

struct CompressedOutput<'a> {
    dst: Vec<u8>,
    cap: usize,
    src: &'a [u8],
}

impl<'a> CompressedOutput<'a> {
    fn new(src: &'a [u8], cap: usize) -> Self {
        CompressedOutput {
            dst: Vec::with_capacity(cap.min(src.len())),
            cap,
            src,
        }
    }

    /// Emits literal bytes `src[from_pos..to_pos]` followed by a back-reference of
    /// length `count` at `offset = to_pos - match_start` (the match start position is
    /// encoded implicitly via the caller; here `to_pos` is where the literal run ends
    /// and the back-reference, if any, begins). Returns `false` if the opcode plus its
    /// trailing literal bytes would not fit within `cap`, in which case the caller must
    /// give up on compression entirely.
    fn emit(&mut self, from_pos: usize, to_pos: usize, count: usize, offset: usize) -> bool {
        let mut from_pos = from_pos;
        let mut total_lit = to_pos - from_pos;

        while total_lit > 3 {
            let chunk = (total_lit - total_lit % 4).min(112);
            let amt4 = chunk / 4;
            if self.dst.len() + 1 + chunk > self.cap {
                return false;
            }
            self.dst.push(0xE0 + (amt4 as u8) - 1);
            self.dst.extend_from_slice(&self.src[from_pos..from_pos + chunk]);
            from_pos += chunk;
            total_lit -= chunk;
        }

        let lit = total_lit;

        if count == 0 {
            if self.dst.len() + 1 + lit > self.cap {
                return false;
            }
            self.dst.push(0xFC + lit as u8);
            self.dst.extend_from_slice(&self.src[from_pos..from_pos + lit]);
            return true;
        }

        let off = offset - 1;
        if off < 1024 && (3..=10).contains(&count) {
            if self.dst.len() + 2 + lit > self.cap {
                return false;
            }
            let b0 = (((off >> 3) & 0x60) as u8) + (((count - 3) * 4) as u8) + lit as u8;
            let b1 = (off & 0xFF) as u8;
            self.dst.push(b0);
            self.dst.push(b1);
        } else if off < 16384 && (4..=67).contains(&count) {
            if self.dst.len() + 3 + lit > self.cap {
                return false;
            }
            let b0 = 0x80 + (count - 4) as u8;
            let b1 = (lit * 0x40) as u8 + ((off >> 8) & 0x3F) as u8;
            let b2 = (off & 0xFF) as u8;
            self.dst.push(b0);
            self.dst.push(b1);
            self.dst.push(b2);
        } else {
            if self.dst.len() + 4 + lit > self.cap {
                return false;
            }
            let b0 = 0xC0 + (((off >> 12) & 0x10) as u8) + ((((count - 5) >> 6) & 0x0C) as u8) + lit as u8;
            let b1 = ((off >> 8) & 0xFF) as u8;
            let b2 = (off & 0xFF) as u8;
            let b3 = (count - 5) as u8;
            self.dst.push(b0);
            self.dst.push(b1);
            self.dst.push(b2);
            self.dst.push(b3);
        }
        self.dst.extend_from_slice(&self.src[from_pos..from_pos + lit]);
        true
    }
}

#[allow(clippy::too_many_arguments)]
fn longest_match(
    cur_match_in: i32,
    hash: &Hash,
    src: &[u8],
    pos: usize,
    remaining: usize,
    prev_length: usize,
    match_start: &mut usize,
) -> usize {
    let mut cur_match = cur_match_in;
    let mut chain_length = MAX_CHAIN;
    let max_len = remaining.min(MAX_MATCH);
    let mut best_len = prev_length.min(max_len);
    let limit = if pos > MAX_DIST { (pos - MAX_DIST) as i64 } else { 0 };

    if prev_length >= NICE_LENGTH || best_len >= max_len {
        return best_len;
    }

    loop {
        let m = cur_match as usize;
        if src[m + best_len] == src[pos + best_len] {
            let mut len = 0;
            while len < max_len && src[m + len] == src[pos + len] {
                len += 1;
            }
            if len > best_len {
                *match_start = m;
                best_len = len;
                if len >= max_len || len >= NICE_LENGTH {
                    break;
                }
            }
        }
        cur_match = hash.getprev(cur_match);
        chain_length -= 1;
        if (cur_match as i64) < limit || chain_length == 0 {
            break;
        }
    }

    best_len
}

/// Runs the lazy-matching compressor over `src`, returning `None` if the encoded form
/// would not fit within `src.len() - 1` bytes (including the frame header) — callers
/// should fall back to storing `src` uncompressed in that case.
pub fn compress(src: &[u8]) -> Option<Vec<u8>> {
    try_compress_with_cap(src, src.len().checked_sub(1)?)
}

/// Public compressibility gate: refuses inputs shorter than the minimum QFS can
/// usefully encode, or too large for the 3-byte decompressed-size field, before
/// running the core algorithm.
pub fn try_compress(src: &[u8]) -> Option<Vec<u8>> {
    if src.len() < MIN_COMPRESS_LEN || src.len() >= MAX_COMPRESS_LEN {
        return None;
    }
    compress(src)
}

fn try_compress_with_cap(src: &[u8], cap: usize) -> Option<Vec<u8>> {
    if src.len() < 2 {
        return None;
    }

    let mut hash = Hash::new();
    let mut out = CompressedOutput::new(src, cap);
    // header placeholder, backpatched at the end
    out.dst.extend_from_slice(&[0u8; HEADER_LEN]);

    hash.update(src[0]);
    hash.update(src[1]);

    let mut pos = 0usize;
    let mut literal_start = 0usize;
    let mut prev_length = MIN_MATCH - 1;
    let mut prev_match = 0usize;
    let mut match_available = false;

    while pos < src.len() {
        let remaining = src.len() - pos;
        let mut match_length = MIN_MATCH - 1;
        let mut match_start = 0usize;

        let hash_head = if remaining >= MIN_MATCH + 1 {
            hash.update(src[pos + 2]);
            hash.insert(pos)
        } else {
            -1
        };

        if hash_head >= 0 && prev_length < MAX_LAZY && pos as i64 - hash_head as i64 <= MAX_DIST as i64 {
            match_length = longest_match(hash_head, &hash, src, pos, remaining, prev_length, &mut match_start);
            if (match_length <= 3 && pos - match_start > 1024) || (match_length <= 4 && pos - match_start > 16384) {
                match_length = MIN_MATCH - 1;
            }
        }

        if match_available && prev_length >= MIN_MATCH && match_length <= prev_length {
            // the match found one position back beats (or ties) the one just found here;
            // commit to it and skip over the bytes it covers
            let match_pos = pos - 1;
            let offset = match_pos - prev_match;
            if !out.emit(literal_start, match_pos, prev_length, offset) {
                return None;
            }
            let target = match_pos + prev_length;
            literal_start = target;

            let mut p = pos + 1;
            while p < target && p < src.len() {
                if p + 2 < src.len() {
                    hash.update(src[p + 2]);
                    hash.insert(p);
                }
                p += 1;
            }
            pos = target.max(p);
            match_available = false;
            prev_length = MIN_MATCH - 1;
        } else {
            // defer: remember this position's candidate match and re-evaluate one byte later
            match_available = match_length >= MIN_MATCH;
            prev_length = match_length;
            prev_match = match_start;
            pos += 1;
        }
    }

    if match_available && prev_length >= MIN_MATCH {
        let match_pos = src.len() - 1;
        let offset = match_pos - prev_match;
        if !out.emit(literal_start, match_pos, prev_length, offset) {
            return None;
        }
        literal_start = match_pos + prev_length;
    }

    if !out.emit(literal_start, src.len(), 0, 0) {
        return None;
    }

    if out.dst.len() >= src.len() {
        return None;
    }

    let compressed_size = out.dst.len() as u32;
    out.dst[0..4].copy_from_slice(&compressed_size.to_le_bytes());
    out.dst[4..6].copy_from_slice(&COMPRESSION_ID.to_le_bytes());
    let decompressed_size = src.len();
    out.dst[6] = ((decompressed_size >> 16) & 0xFF) as u8;
    out.dst[7] = ((decompressed_size >> 8) & 0xFF) as u8;
    out.dst[8] = (decompressed_size & 0xFF) as u8;

    Some(out.dst)
}
