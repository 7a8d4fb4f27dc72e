//! # RTP packet view
//!
//! Read-only view over a raw RTP packet — just the fields the reassembly
//! core needs: sequence number, timestamp, payload type, marker bit, and
//! where the transport header (fixed part + CSRC list + extension) ends.
//! Everything else about RTP (SSRC demux, SRTP, jitter estimation) belongs
//! to the surrounding pipeline.

use bytes::{BufMut, Bytes, BytesMut};

/// Fixed RTP header size: V/P/X/CC, M/PT, sequence, timestamp, SSRC.
pub const MIN_HEADER_SIZE: usize = 12;

const RTP_VERSION: u8 = 2;

// ─── Sequence ordering ──────────────────────────────────────────────────────

/// `true` if sequence number `a` precedes `b` under 16-bit wraparound
/// arithmetic: `a < b` iff `(i16)(a - b) < 0`. With this comparator
/// `65534 < 65535 < 0 < 1`.
#[inline]
pub fn seq_less(a: u16, b: u16) -> bool {
    (a.wrapping_sub(b) as i16) < 0
}

/// Wraparound-aware ordering for sorting packets of one frame group.
#[inline]
pub fn seq_cmp(a: u16, b: u16) -> std::cmp::Ordering {
    if a == b {
        std::cmp::Ordering::Equal
    } else if seq_less(a, b) {
        std::cmp::Ordering::Less
    } else {
        std::cmp::Ordering::Greater
    }
}

// ─── Packet view ────────────────────────────────────────────────────────────

/// A parsed RTP packet. Owns the raw bytes; header fields are decoded once
/// at construction and the payload is exposed as a borrowed slice.
#[derive(Debug, Clone)]
pub struct RtpPacket {
    data: Bytes,
    header_len: usize,
    sequence: u16,
    timestamp: u32,
    payload_type: u8,
    marker: bool,
}

impl RtpPacket {
    /// Parse a raw RTP packet. Returns `None` if the buffer is shorter than
    /// the fixed header, the version is not 2, or the CSRC list / extension
    /// header runs past the end of the buffer.
    pub fn parse(data: Bytes) -> Option<Self> {
        if data.len() < MIN_HEADER_SIZE {
            return None;
        }

        let b0 = data[0];
        if b0 >> 6 != RTP_VERSION {
            return None;
        }
        let has_extension = b0 & 0b0001_0000 != 0;
        let csrc_count = (b0 & 0b0000_1111) as usize;

        let b1 = data[1];
        let marker = b1 & 0b1000_0000 != 0;
        let payload_type = b1 & 0b0111_1111;

        let sequence = u16::from_be_bytes([data[2], data[3]]);
        let timestamp = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);

        let mut header_len = MIN_HEADER_SIZE + 4 * csrc_count;
        if data.len() < header_len {
            return None;
        }
        if has_extension {
            // Extension header: 16-bit profile, 16-bit length in 32-bit words.
            if data.len() < header_len + 4 {
                return None;
            }
            let ext_words =
                u16::from_be_bytes([data[header_len + 2], data[header_len + 3]]) as usize;
            header_len += 4 + 4 * ext_words;
            if data.len() < header_len {
                return None;
            }
        }

        Some(RtpPacket {
            data,
            header_len,
            sequence,
            timestamp,
            payload_type,
            marker,
        })
    }

    /// 16-bit sequence number (wraps).
    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    /// 32-bit media timestamp.
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// 7-bit payload type.
    pub fn payload_type(&self) -> u8 {
        self.payload_type
    }

    /// Marker bit — set on the last packet of a frame.
    pub fn marker(&self) -> bool {
        self.marker
    }

    /// Byte offset at which the transport header (including any extension)
    /// ends.
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Payload bytes after the transport header. May be empty.
    pub fn payload(&self) -> &[u8] {
        &self.data[self.header_len..]
    }

    /// The raw packet bytes.
    pub fn raw(&self) -> &Bytes {
        &self.data
    }
}

// ─── Packet construction ────────────────────────────────────────────────────

/// Serialize a minimal RTP packet: fixed 12-byte header (no CSRC list, no
/// extension) followed by `payload`. The packetization counterpart to
/// [`RtpPacket::parse`] — sequence numbering and marker placement are the
/// caller's job.
pub fn build_packet(
    sequence: u16,
    timestamp: u32,
    ssrc: u32,
    payload_type: u8,
    marker: bool,
    payload: &[u8],
) -> Bytes {
    let mut buf = BytesMut::with_capacity(MIN_HEADER_SIZE + payload.len());
    buf.put_u8(RTP_VERSION << 6);
    buf.put_u8(((marker as u8) << 7) | (payload_type & 0x7F));
    buf.put_u16(sequence);
    buf.put_u32(timestamp);
    buf.put_u32(ssrc);
    buf.put_slice(payload);
    buf.freeze()
}
