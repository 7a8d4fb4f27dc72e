//! # AV1 aggregation descriptor
//!
//! The 1–2 byte descriptor that prefixes every AV1 RTP payload.
//!
//! ## Layout (first byte, MSB first)
//!
//! ```text
//!  0 1 2 3 4 5 6 7
//! +-+-+-+-+-+-+-+-+
//! |S|E|Z|Y|0 0 0|N|
//! +-+-+-+-+-+-+-+-+
//! ```
//!
//! - `S` — start of frame
//! - `E` — end of frame
//! - `Z` — zeros flag (ignored by reassembly)
//! - `Y` — ones flag (ignored by reassembly)
//! - `N` — OBU count byte follows
//!
//! If `N=1`, the second byte is the OBU count. When that count is non-zero
//! the wire spec additionally defines a per-OBU length table; this codec
//! does not parse it and treats everything after the descriptor as one
//! opaque chunk of OBU data.

use bytes::BufMut;
use thiserror::Error;

// ─── Bit masks (first descriptor byte) ──────────────────────────────────────

const START_BIT: u8 = 0x80;
const END_BIT: u8 = 0x40;
const ZEROS_BIT: u8 = 0x20;
const ONES_BIT: u8 = 0x10;
const OBU_COUNT_BIT: u8 = 0x01;

/// Maximum descriptor length this codec produces or consumes.
pub const MAX_DESCRIPTOR_LEN: usize = 2;

// ─── Errors ─────────────────────────────────────────────────────────────────

/// The descriptor byte window was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("malformed aggregation header: no descriptor byte")]
pub struct MalformedHeader;

// ─── Aggregation Header ─────────────────────────────────────────────────────

/// Decoded AV1 aggregation descriptor flags.
///
/// Immutable once parsed; serialization always produces a fresh byte, so
/// fragment generation overrides flags on a copy rather than patching the
/// original in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationHeader {
    /// First packet of a frame (temporal unit).
    pub start_of_frame: bool,
    /// Last packet of a frame. The RTP marker bit, not this flag, is
    /// authoritative for frame-boundary detection.
    pub end_of_frame: bool,
    /// Zeros flag — carried through, unused by reassembly.
    pub zeros_flag: bool,
    /// Ones flag — carried through, unused by reassembly.
    pub ones_flag: bool,
    /// An OBU count byte follows the first descriptor byte.
    pub has_obu_count: bool,
}

impl AggregationHeader {
    /// Parse a descriptor from the front of a payload window.
    ///
    /// Returns the header and the number of bytes consumed: 1 for the
    /// mandatory byte, 2 when `N` is set and a count byte is present. If `N`
    /// is set but the window ends after the first byte, the consumed length
    /// is still 1 — the header is truncated and the caller decides whether
    /// the packet is usable.
    pub fn parse(bytes: &[u8]) -> Result<(Self, usize), MalformedHeader> {
        let first = *bytes.first().ok_or(MalformedHeader)?;

        let header = AggregationHeader {
            start_of_frame: first & START_BIT != 0,
            end_of_frame: first & END_BIT != 0,
            zeros_flag: first & ZEROS_BIT != 0,
            ones_flag: first & ONES_BIT != 0,
            has_obu_count: first & OBU_COUNT_BIT != 0,
        };

        // The count byte is consumed but left opaque: the per-OBU length
        // table it may announce is not parsed.
        let consumed = if header.has_obu_count && bytes.len() >= 2 {
            2
        } else {
            1
        };

        Ok((header, consumed))
    }

    /// Serialize the mandatory first byte into `buf`.
    ///
    /// The optional count byte is not regenerated; callers that need it
    /// append the retained original byte after this one.
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.first_byte());
    }

    /// The mandatory first byte, reserved bits zero.
    pub fn first_byte(&self) -> u8 {
        let mut b = 0u8;
        if self.start_of_frame {
            b |= START_BIT;
        }
        if self.end_of_frame {
            b |= END_BIT;
        }
        if self.zeros_flag {
            b |= ZEROS_BIT;
        }
        if self.ones_flag {
            b |= ONES_BIT;
        }
        if self.has_obu_count {
            b |= OBU_COUNT_BIT;
        }
        b
    }

    /// Descriptor length implied by the flags: 1, or 2 when a count byte
    /// follows.
    pub fn byte_len(&self) -> usize {
        if self.has_obu_count {
            2
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use proptest::prelude::*;

    #[test]
    fn parse_empty_fails() {
        assert_eq!(AggregationHeader::parse(&[]), Err(MalformedHeader));
    }

    #[test]
    fn parse_all_flags() {
        // S E Z Y set, N clear
        let (h, consumed) = AggregationHeader::parse(&[0xF0, 0xAA]).unwrap();
        assert!(h.start_of_frame);
        assert!(h.end_of_frame);
        assert!(h.zeros_flag);
        assert!(h.ones_flag);
        assert!(!h.has_obu_count);
        assert_eq!(consumed, 1);
    }

    #[test]
    fn parse_obu_count_byte_consumed() {
        let (h, consumed) = AggregationHeader::parse(&[0x81, 0x03, 0xFF]).unwrap();
        assert!(h.start_of_frame);
        assert!(h.has_obu_count);
        assert_eq!(consumed, 2);
        assert_eq!(h.byte_len(), 2);
    }

    #[test]
    fn parse_truncated_count_byte() {
        // N set but the window ends after the first byte
        let (h, consumed) = AggregationHeader::parse(&[0x01]).unwrap();
        assert!(h.has_obu_count);
        assert_eq!(consumed, 1, "truncated descriptor reports only the first byte");
    }

    #[test]
    fn reserved_bits_ignored_on_parse_zero_on_encode() {
        let (h, _) = AggregationHeader::parse(&[0b1000_1110]).unwrap();
        assert!(h.start_of_frame);
        assert!(!h.has_obu_count);
        assert_eq!(h.first_byte() & 0b0000_1110, 0);
    }

    #[test]
    fn encode_single_byte() {
        let h = AggregationHeader {
            start_of_frame: true,
            end_of_frame: false,
            zeros_flag: true,
            ones_flag: false,
            has_obu_count: true,
        };
        let mut buf = BytesMut::new();
        h.encode(&mut buf);
        assert_eq!(&buf[..], &[0xA1]);
    }

    proptest! {
        #[test]
        fn proptest_first_byte_roundtrip(first in any::<u8>()) {
            let (h, _) = AggregationHeader::parse(&[first, 0x00]).unwrap();
            // Reserved bits are dropped, everything else round-trips.
            prop_assert_eq!(h.first_byte(), first & 0b1111_0001);
            let (h2, _) = AggregationHeader::parse(&[h.first_byte(), 0x00]).unwrap();
            prop_assert_eq!(h, h2);
        }

        #[test]
        fn proptest_consumed_len_matches_byte_len(first in any::<u8>()) {
            let (h, consumed) = AggregationHeader::parse(&[first, 0x00]).unwrap();
            prop_assert_eq!(consumed, h.byte_len());
        }
    }
}
