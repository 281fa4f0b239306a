use super::{QfsError, COMPRESSION_ID, HEADER_LEN};

/// Strict mode requires the header's declared lengths to equal the caller-supplied
/// sizes exactly and the decode to consume all input while filling all output.
/// Truncate mode decodes only the first `want` output bytes and tolerates a header
/// whose declared sizes are *at least* as large as what the caller asked for — used
/// for header-sniffing the first bytes of a resource without reading the whole thing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    Strict,
    Truncate,
}

/// Decodes a QFS frame.
///
/// `src` is exactly the window of compressed bytes available to the decoder (the
/// full on-disk payload in strict mode, or a short prefix in truncate mode).
/// `decompressed_size` is the number of output bytes the caller wants: the full
/// decompressed resource size in strict mode, or a short prefix length (e.g. 64)
/// in truncate mode.
pub fn decompress(src: &[u8], decompressed_size: usize, mode: DecodeMode) -> Result<Vec<u8>, QfsError> {
    if src.len() < HEADER_LEN + 1 {
        return Err(QfsError::InvalidHeader);
    }

    let compression_id = u16::from_le_bytes([src[4], src[5]]);
    if compression_id != COMPRESSION_ID {
        return Err(QfsError::InvalidHeader);
    }

    let hdr_compressed_size = u32::from_le_bytes([src[0], src[1], src[2], src[3]]) as usize;
    let hdr_decompressed_size = ((src[6] as usize) << 16) | ((src[7] as usize) << 8) | (src[8] as usize);

    let compressed_size = src.len();
    let truncate = mode == DecodeMode::Truncate;
    if truncate {
        if hdr_compressed_size < compressed_size || hdr_decompressed_size < decompressed_size {
            return Err(QfsError::LengthMismatch);
        }
    } else if hdr_compressed_size != compressed_size || hdr_decompressed_size != decompressed_size {
        return Err(QfsError::LengthMismatch);
    }

    let src_end = src.len();
    let mut sp = HEADER_LEN;
    let mut dst: Vec<u8> = Vec::with_capacity(decompressed_size);

    loop {
        if sp >= src_end {
            return Err(QfsError::TruncatedInput);
        }
        let b0 = src[sp] as usize;
        sp += 1;

        let (mut lit, copy, offset);
        if b0 < 0x80 {
            if sp >= src_end {
                return Err(QfsError::TruncatedInput);
            }
            let b1 = src[sp] as usize;
            sp += 1;
            lit = b0 & 0x03;
            copy = ((b0 & 0x1C) >> 2) + 3;
            offset = ((b0 & 0x60) << 3) + b1 + 1;
        } else if b0 < 0xC0 {
            if sp + 2 > src_end {
                return Err(QfsError::TruncatedInput);
            }
            let b1 = src[sp] as usize;
            let b2 = src[sp + 1] as usize;
            sp += 2;
            lit = (b1 & 0xC0) >> 6;
            copy = (b0 & 0x3F) + 4;
            offset = ((b1 & 0x3F) << 8) + b2 + 1;
        } else if b0 < 0xE0 {
            if sp + 3 > src_end {
                return Err(QfsError::TruncatedInput);
            }
            let b1 = src[sp] as usize;
            let b2 = src[sp + 1] as usize;
            let b3 = src[sp + 2] as usize;
            sp += 3;
            lit = b0 & 0x03;
            copy = ((b0 & 0x0C) << 6) + b3 + 5;
            offset = ((b0 & 0x10) << 12) + (b1 << 8) + b2 + 1;
        } else if b0 < 0xFC {
            lit = (b0 - 0xDF) * 4;
            copy = 0;
            offset = 0;
        } else {
            lit = b0 - 0xFC;
            copy = 0;
            offset = 0;
        }

        let mut copy = copy;
        if sp + lit > src_end || dst.len() + lit + copy > decompressed_size {
            if !truncate {
                return Err(QfsError::TruncatedInput);
            }
            let remaining_out = decompressed_size.saturating_sub(dst.len());
            if lit > remaining_out {
                lit = remaining_out;
            }
            let remaining_after_lit = decompressed_size.saturating_sub(dst.len() + lit);
            if copy > remaining_after_lit {
                copy = remaining_after_lit;
            }
            if sp + lit > src_end {
                return Err(QfsError::TruncatedInput);
            }
        }

        if lit > 0 {
            dst.extend_from_slice(&src[sp..sp + lit]);
            sp += lit;
        }
        if copy > 0 {
            if offset > dst.len() {
                return Err(QfsError::InvalidBackReference);
            }
            if offset == 1 {
                let b = *dst.last().unwrap();
                dst.resize(dst.len() + copy, b);
            } else {
                for _ in 0..copy {
                    let v = dst[dst.len() - offset];
                    dst.push(v);
                }
            }
        }

        if sp >= src_end || dst.len() >= decompressed_size {
            break;
        }
    }

    if truncate {
        if dst.len() == decompressed_size {
            Ok(dst)
        } else {
            Err(QfsError::OverrunOutput)
        }
    } else {
        let mut p = sp;
        while p < src_end && src[p] == 0xFC {
            p += 1;
        }
        if p == src_end && dst.len() == decompressed_size {
            Ok(dst)
        } else {
            Err(QfsError::OverrunOutput)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qfs::compress;

    #[test]
    fn short_input_rejects_invalid_header() {
        let err = decompress(&[0u8; 5], 0, DecodeMode::Strict).unwrap_err();
        assert_eq!(err, QfsError::InvalidHeader);
    }

    #[test]
    fn wrong_sentinel_rejects_invalid_header() {
        let mut frame = vec![0u8; 10];
        frame[4] = 0xAB;
        frame[5] = 0xCD;
        let err = decompress(&frame, 0, DecodeMode::Strict).unwrap_err();
        assert_eq!(err, QfsError::InvalidHeader);
    }

    #[test]
    fn offset_one_back_reference_repeats_last_byte() {
        // header: compressed_size=12 LE, sentinel 0xFB10, decompressed_size=5 (3BE)
        // body: literal run of 1 byte 'A' (0xFC+1=0xFD), then a 3-copy offset-1 back ref
        // using the 2-byte opcode family: b0 in 0x00..0x7F, lit=0, copy=3, offset=1
        // b0 = (copy-3)*4 bits2..4 | lit bits0..1 | offset high bits5..6
        // offset=1 => offset-1=0 => high bits from (0<<3)&0x60=0, b1 = 0
        // copy=3 => (copy-3)=0 => bits2..4=0
        // b0 = 0
        let mut body = vec![0xFD, b'A']; // literal run: 1 literal byte 'A'
        body.push(0x00); // opcode: lit=0, copy=3, offset=1
        body.push(0x00); // b1 = offset-1 low byte = 0
        body.push(0xFC); // terminator, 0 trailing literals
        let decompressed_size = 1 + 3;
        let mut frame = Vec::new();
        frame.extend_from_slice(&((9 + body.len()) as u32).to_le_bytes());
        frame.extend_from_slice(&0xFB10u16.to_le_bytes());
        frame.push(((decompressed_size >> 16) & 0xFF) as u8);
        frame.push(((decompressed_size >> 8) & 0xFF) as u8);
        frame.push((decompressed_size & 0xFF) as u8);
        frame.extend_from_slice(&body);

        let out = decompress(&frame, decompressed_size, DecodeMode::Strict).unwrap();
        assert_eq!(out, b"AAAA");
    }

    #[test]
    fn fifty_byte_literal_sequence_round_trips_and_refuses_to_compress() {
        let data: Vec<u8> = (0..50u8).collect();
        assert!(compress(&data).is_none());
    }

    #[test]
    fn truncated_input_is_rejected_in_strict_mode() {
        let data: Vec<u8> = (0..200u8).collect();
        let compressed = {
            let mut repeated = Vec::new();
            for _ in 0..10 {
                repeated.extend_from_slice(&data);
            }
            crate::qfs::compress(&repeated).expect("should compress, highly repetitive")
        };
        let truncated = &compressed[..compressed.len() - 2];
        let err = decompress(truncated, 2000, DecodeMode::Strict).unwrap_err();
        assert_eq!(err, QfsError::LengthMismatch);
    }
}
