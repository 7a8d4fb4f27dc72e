//! # Depacketizer state machine
//!
//! Pure logic — no I/O, no timers. Consumes batches of RTP packets, groups
//! them by timestamp, validates strict sequence continuity, and emits
//! reconstructed AV1 temporal units.
//!
//! ## Responsibilities
//!
//! 1. **Partitioning**: media packets are buffered, control entries pass
//!    through the batch untouched
//! 2. **Grouping**: collect a contiguous, gap-free sequence run sharing one
//!    timestamp, under 16-bit wraparound arithmetic
//! 3. **Boundary detection**: a group completes only when its highest packet
//!    carries the RTP marker bit; the aggregation header's `E` flag is
//!    informational only
//! 4. **Frame building**: strip transport and aggregation headers, require a
//!    `S` (start) flag somewhere in the group, concatenate OBU bytes
//!
//! Incomplete groups are re-buffered and retried on the next call; groups
//! failing the start/marker acceptance test are discarded permanently. One
//! instance serves one RTP stream — callers shard per stream, there is no
//! process-wide state.

use bytes::BytesMut;
use std::collections::VecDeque;

use crate::rtp::{seq_cmp, RtpPacket};
use crate::stage::{Frame, MediaStage, Message};
use crate::stats::DepacketizerStats;
use crate::wire::AggregationHeader;

/// RTP clock rate for video: 90 kHz.
pub const CLOCK_RATE: u32 = 90_000;

// ─── Depacketizer ───────────────────────────────────────────────────────────

/// Reassembles AV1 temporal units from RTP packet batches.
pub struct Av1Depacketizer {
    /// Packets not yet consumed into a frame, in arrival order except where
    /// an incomplete group was re-inserted at the front.
    pending: VecDeque<RtpPacket>,
    clock_rate: u32,
    stats: DepacketizerStats,
}

impl Default for Av1Depacketizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Av1Depacketizer {
    /// Create a depacketizer using the standard 90 kHz video clock.
    pub fn new() -> Self {
        Av1Depacketizer {
            pending: VecDeque::new(),
            clock_rate: CLOCK_RATE,
            stats: DepacketizerStats::default(),
        }
    }

    /// Override the clock rate used to derive presentation seconds.
    ///
    /// Panics if `clock_rate` is zero — presentation times would divide by
    /// zero.
    pub fn with_clock_rate(mut self, clock_rate: u32) -> Self {
        assert!(clock_rate > 0, "clock rate must be non-zero");
        self.clock_rate = clock_rate;
        self
    }

    /// Number of packets currently buffered for incomplete groups.
    ///
    /// There is no staleness bound: sustained loss grows this without limit,
    /// so callers that care should watch it and discard the instance.
    pub fn pending_packets(&self) -> usize {
        self.pending.len()
    }

    /// Current counters.
    pub fn stats(&self) -> &DepacketizerStats {
        &self.stats
    }

    /// Buffer surviving media packets from the batch, preserving arrival
    /// order. Control (and already-reconstructed) entries stay in place.
    fn buffer_media(&mut self, messages: &mut Vec<Message>) {
        let batch = std::mem::take(messages);
        for msg in batch {
            match msg {
                Message::Media(raw) => {
                    let size = raw.len();
                    match RtpPacket::parse(raw) {
                        Some(pkt) => {
                            self.stats.packets_buffered += 1;
                            self.pending.push_back(pkt);
                        }
                        None => {
                            self.stats.short_packets_dropped += 1;
                            tracing::trace!(size, "dropping short or malformed RTP packet");
                        }
                    }
                }
                other => messages.push(other),
            }
        }
    }

    /// Collect the front timestamp's packets into a group.
    ///
    /// Walks the buffer in order, removing packets whose timestamp matches
    /// the front packet's and whose sequence numbers form a contiguous run.
    /// Returns the group plus whether the walk hit a sequence gap and
    /// whether any collected packet carried the marker bit.
    fn collect_group(&mut self, ts: u32, start_seq: u16) -> (Vec<RtpPacket>, bool, bool) {
        let mut expected_seq = start_seq;
        let mut group = Vec::new();
        let mut marker_found = false;
        let mut gap = false;

        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].timestamp() != ts {
                i += 1;
                continue;
            }
            if self.pending[i].sequence() != expected_seq {
                gap = true;
                break;
            }
            let pkt = self.pending.remove(i).expect("index in bounds");
            marker_found |= pkt.marker();
            group.push(pkt);
            expected_seq = expected_seq.wrapping_add(1);
            // The removal shifted the next candidate into slot `i`.
        }

        (group, gap, marker_found)
    }

    /// Build a frame from a complete candidate group.
    ///
    /// Returns `None` when the group fails the acceptance test (no `S` flag,
    /// or the highest-sequence packet lacks the marker bit) or yields no
    /// bytes. Rejection is permanent — the packets are gone either way.
    fn build_frame(&mut self, mut group: Vec<RtpPacket>, timestamp: u32) -> Option<Frame> {
        // The scan already produces sequence order; the sort guards against
        // any reordering introduced by incomplete-group re-insertion.
        group.sort_by(|a, b| seq_cmp(a.sequence(), b.sequence()));

        let payload_type = group.first()?.payload_type();
        let last_marker = group.last()?.marker();

        let mut data = BytesMut::new();
        let mut found_start = false;

        for pkt in &group {
            let payload = pkt.payload();
            if payload.is_empty() {
                self.stats.undersized_skipped += 1;
                continue;
            }
            // Non-empty window, parse cannot fail.
            let (header, descriptor_len) = match AggregationHeader::parse(payload) {
                Ok(parsed) => parsed,
                Err(_) => continue,
            };
            if header.start_of_frame {
                found_start = true;
            }
            if descriptor_len >= payload.len() {
                // Descriptor only — nothing usable, but the group survives.
                self.stats.undersized_skipped += 1;
                continue;
            }
            data.extend_from_slice(&payload[descriptor_len..]);
        }

        // The marker bit, not the descriptor's E flag, is authoritative for
        // the frame boundary.
        if !found_start || !last_marker {
            self.stats.groups_rejected += 1;
            tracing::debug!(
                timestamp,
                packets = group.len(),
                found_start,
                last_marker,
                "discarding frame group failing start/marker acceptance"
            );
            return None;
        }

        if data.is_empty() {
            return None;
        }

        self.stats.frames_emitted += 1;
        Some(Frame {
            timestamp,
            seconds: timestamp as f64 / self.clock_rate as f64,
            payload_type,
            data: data.freeze(),
        })
    }
}

impl MediaStage for Av1Depacketizer {
    /// Ingest a batch: buffer media packets, then repeatedly group the
    /// buffer's front timestamp. Each complete group becomes a frame
    /// appended to the batch; the first incomplete group is re-buffered at
    /// the front in original order and processing halts until more packets
    /// arrive. The callback is unused — this stage only pulls.
    fn incoming(&mut self, messages: &mut Vec<Message>, _send: &mut dyn FnMut(Message)) {
        self.buffer_media(messages);

        while let Some(front) = self.pending.front() {
            let timestamp = front.timestamp();
            let start_seq = front.sequence();
            let (group, gap, marker_found) = self.collect_group(timestamp, start_seq);

            if gap || !marker_found {
                // Incomplete — put the run back in front, original order,
                // and wait for a future call.
                for pkt in group.into_iter().rev() {
                    self.pending.push_front(pkt);
                }
                break;
            }

            if let Some(frame) = self.build_frame(group, timestamp) {
                messages.push(Message::Frame(frame));
            }
        }
    }
}
