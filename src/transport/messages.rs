//! # Wire Messages
//!
//! The tagged message union spoken over the relay. Every frame is a JSON
//! object discriminated by a `type` tag; the relay forwards them opaquely
//! and only the two endpoints ever decode the payloads.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::transport::codec::WireEnvelope;

/// Messages exchanged between two hands over the relay.
///
/// Serialized as JSON text frames. Unknown `type` tags fail decoding with
/// `MalformedWireData`; there is no forward-compatibility fallback at this
/// layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireMessage {
    /// A chat message carrying one signed, encrypted envelope
    Message {
        /// Sender session id
        from: String,
        /// Recipient session id
        to: String,
        /// The encoded envelope
        content: WireEnvelope,
    },

    /// Announces an upcoming file transfer. Always the first frame of a
    /// transfer.
    #[serde(rename_all = "camelCase")]
    FileMetadata {
        /// Sender session id
        from: String,
        /// Recipient session id
        to: String,
        /// Transfer identifier correlating all frames of this file
        file_id: String,
        /// Total file size in bytes
        file_size: u64,
        /// Number of chunks that will follow
        total_chunks: u32,
    },

    /// One encrypted chunk of file data
    #[serde(rename_all = "camelCase")]
    FileChunk {
        /// Sender session id
        from: String,
        /// Recipient session id
        to: String,
        /// Transfer identifier
        file_id: String,
        /// Zero-based chunk position
        chunk_index: u32,
        /// The chunk, encrypted and signed like any message
        payload: WireEnvelope,
    },

    /// Marks the end of a transfer. Always the last frame.
    #[serde(rename_all = "camelCase")]
    FileComplete {
        /// Sender session id
        from: String,
        /// Recipient session id
        to: String,
        /// Transfer identifier
        file_id: String,
    },
}

impl WireMessage {
    /// Decode a frame, rejecting anything that is not a known message shape
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::MalformedWireData(e.to_string()))
    }

    /// Serialize for transmission
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Get the file id from any file-transfer variant
    pub fn file_id(&self) -> Option<&str> {
        match self {
            Self::Message { .. } => None,
            Self::FileMetadata { file_id, .. } => Some(file_id),
            Self::FileChunk { file_id, .. } => Some(file_id),
            Self::FileComplete { file_id, .. } => Some(file_id),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
