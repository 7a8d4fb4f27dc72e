//! # Fragmenter
//!
//! Splits an encoded unit (aggregation descriptor + OBU bytes) into
//! transport-sized fragments, rewriting the descriptor flags per fragment:
//! only the first fragment keeps `S`, only the last keeps `E`. The caller
//! attaches sequence numbers and sets the RTP marker bit on the last
//! fragment of the frame.
//!
//! Pure functions, no state — safe to call concurrently on independent
//! inputs.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::wire::AggregationHeader;

// ─── Errors ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PacketizeError {
    /// `max_fragment_size` cannot hold the descriptor plus at least one
    /// payload byte. A configuration error — failing loudly beats emitting
    /// fragments that carry no payload and never terminate the split.
    #[error(
        "fragment size {max_fragment_size} cannot hold a {descriptor_len}-byte \
         descriptor plus payload"
    )]
    BudgetExhausted {
        max_fragment_size: usize,
        descriptor_len: usize,
    },
}

// ─── Fragmentation ──────────────────────────────────────────────────────────

/// Split `unit` into fragments of at most `max_fragment_size` bytes.
///
/// A unit that already fits is returned unchanged as a single fragment. If
/// the descriptor cannot be separated from payload (unparseable, or it
/// consumes the entire unit), the whole unit is returned as one oversized
/// fragment and the transport decides its fate — no further splitting is
/// attempted. Fragments are returned in ascending order.
pub fn fragment(unit: &Bytes, max_fragment_size: usize) -> Result<Vec<Bytes>, PacketizeError> {
    if unit.len() <= max_fragment_size {
        return Ok(vec![unit.clone()]);
    }

    let (header, descriptor_len) = match AggregationHeader::parse(unit) {
        Ok(parsed) => parsed,
        Err(_) => return Ok(vec![unit.clone()]),
    };
    if descriptor_len >= unit.len() {
        tracing::debug!(
            unit_len = unit.len(),
            descriptor_len,
            "descriptor consumes entire unit, passing through oversized"
        );
        return Ok(vec![unit.clone()]);
    }

    if max_fragment_size <= descriptor_len {
        return Err(PacketizeError::BudgetExhausted {
            max_fragment_size,
            descriptor_len,
        });
    }
    let budget = max_fragment_size - descriptor_len;

    let payload = &unit[descriptor_len..];
    let total = payload.len();
    let mut fragments = Vec::with_capacity(total.div_ceil(budget));

    let mut offset = 0;
    while offset < total {
        let end = (offset + budget).min(total);

        let mut fragment_header = header;
        if offset != 0 {
            fragment_header.start_of_frame = false;
        }
        if end != total {
            fragment_header.end_of_frame = false;
        }

        let mut buf = BytesMut::with_capacity(descriptor_len + (end - offset));
        fragment_header.encode(&mut buf);
        if descriptor_len == 2 {
            // Retained OBU count byte, passed through unmodified.
            buf.put_u8(unit[1]);
        }
        buf.put_slice(&payload[offset..end]);
        fragments.push(buf.freeze());

        offset = end;
    }

    Ok(fragments)
}

/// Fragment each unit in `units`, preserving relative order. Units that
/// already fit pass through unmodified.
pub fn fragment_many(
    units: &[Bytes],
    max_fragment_size: usize,
) -> Result<Vec<Bytes>, PacketizeError> {
    let mut out = Vec::with_capacity(units.len());
    for unit in units {
        out.extend(fragment(unit, max_fragment_size)?);
    }
    Ok(out)
}
