//! # Depacketizer statistics
//!
//! Plain counters for the reassembly path, designed for JSON export.

use serde::Serialize;

/// Aggregate depacketizer counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DepacketizerStats {
    /// Media packets accepted into the pending buffer.
    pub packets_buffered: u64,
    /// Media packets dropped before buffering (shorter than the RTP header
    /// or otherwise unparseable).
    pub short_packets_dropped: u64,
    /// Packets inside an accepted group that carried no usable bytes after
    /// their own headers and were skipped.
    pub undersized_skipped: u64,
    /// Frames emitted to the batch.
    pub frames_emitted: u64,
    /// Complete groups permanently discarded by the start/marker acceptance
    /// test.
    pub groups_rejected: u64,
}

impl DepacketizerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejected groups as a fraction of all completed groups.
    pub fn reject_ratio(&self) -> f64 {
        let total = self.frames_emitted + self.groups_rejected;
        if total == 0 {
            0.0
        } else {
            self.groups_rejected as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_ratio_zero_when_idle() {
        assert_eq!(DepacketizerStats::default().reject_ratio(), 0.0);
    }

    #[test]
    fn serializes_to_json() {
        let stats = DepacketizerStats {
            frames_emitted: 3,
            ..Default::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["frames_emitted"], 3);
    }
}
