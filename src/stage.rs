//! # Media stage contract
//!
//! A stage consumes a batch of messages in place: entries it recognizes are
//! removed and replaced by its output, everything else passes through
//! untouched. The depacketizer is the one conforming implementation in this
//! crate — it removes RTP media entries and appends reconstructed frames.

use bytes::Bytes;

/// One entry in a stage's message batch.
#[derive(Debug, Clone)]
pub enum Message {
    /// Non-media control traffic — stages pass these through untouched.
    Control(Bytes),
    /// A raw transport packet (RTP header + payload).
    Media(Bytes),
    /// A reconstructed frame produced by a stage.
    Frame(Frame),
}

/// A reconstructed AV1 temporal unit.
#[derive(Debug, Clone)]
pub struct Frame {
    /// RTP timestamp of the frame's packet group.
    pub timestamp: u32,
    /// Presentation time in seconds: `timestamp / clock_rate`.
    pub seconds: f64,
    /// RTP payload type of the frame's packets.
    pub payload_type: u8,
    /// Concatenated OBU bytes, aggregation descriptors stripped.
    pub data: Bytes,
}

/// A batch-oriented media processing stage.
pub trait MediaStage {
    /// Process `messages` in place. `send` lets a stage push messages in the
    /// opposite direction (e.g. feedback packets); pull-only stages ignore
    /// it.
    fn incoming(&mut self, messages: &mut Vec<Message>, send: &mut dyn FnMut(Message));
}
