//! # av1-packet
//!
//! AV1 RTP payload fragmentation and temporal-unit reassembly.
//!
//! Reconstructs decodable AV1 temporal units from RTP packets that may
//! arrive out of order, be lost, or be duplicated; and splits an encoded
//! unit (aggregation descriptor + OBU bytes) into transport-sized fragments.
//! Session negotiation, SRTP, and socket I/O live elsewhere — this crate is
//! pure call-and-return logic.
//!
//! ## Crate structure
//!
//! - [`wire`] — AV1 aggregation descriptor parsing/serialization
//! - [`rtp`] — read-only RTP packet view, wraparound sequence ordering
//! - [`stage`] — batch-oriented media stage contract, reconstructed frames
//! - [`packetizer`] — descriptor-rewriting fragmentation
//! - [`depacketizer`] — timestamp grouping, continuity checks, frame building
//! - [`stats`] — reassembly counters

pub mod depacketizer;
pub mod packetizer;
pub mod rtp;
pub mod stage;
pub mod stats;
pub mod wire;

pub use depacketizer::{Av1Depacketizer, CLOCK_RATE};
pub use packetizer::{fragment, fragment_many, PacketizeError};
pub use stage::{Frame, MediaStage, Message};
pub use wire::{AggregationHeader, MalformedHeader};
