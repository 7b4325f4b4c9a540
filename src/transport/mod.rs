//! # Transport Layer
//!
//! The boundary between the binary cryptographic world and the JSON text
//! frames the relay forwards.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         TRANSPORT LAYER                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  SignedEnvelope ──encode──► WireEnvelope ──to_json──► text frame       │
//! │  text frame ──from_json──► WireMessage ──decode──► SignedEnvelope      │
//! │                                                                         │
//! │  Outbound frames go through a FrameSink, which exposes the channel's   │
//! │  backlog for flow control and a closure signal for cancellation.       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod channel;
mod codec;
mod messages;

#[cfg(test)]
pub(crate) use channel::test_support;

pub use channel::{drain_backlog, FrameSink, DRAIN_POLL_INTERVAL};
pub use codec::{decode, encode, WireAesPayload, WireEnvelope, WirePayload};
pub use messages::WireMessage;
