//! # Chunked File Transfer
//!
//! Splits a file into fixed-size chunks, encrypts and signs each chunk
//! independently, streams them through the relay with flow control, and
//! reassembles them on the far side.
//!
//! ## Transfer Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     FILE TRANSFER PROTOCOL                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Sender                              Recipient                         │
//! │  ──────                              ─────────                         │
//! │                                                                         │
//! │  1. file_metadata ──────────────────► validate bounds                  │
//! │     (fileId, fileSize, totalChunks)   reject permanently on failure    │
//! │                                                                         │
//! │  2. file_chunk ─────────────────────► decode → verify → decrypt        │
//! │     (index, encrypted+signed          store by index                   │
//! │      base64 of the raw bytes)         (last write wins)                │
//! │                                                                         │
//! │     ...one frame per chunk, in        chunks may arrive in any         │
//! │     order, draining the sink          order                            │
//! │     backlog before each send...                                        │
//! │                                                                         │
//! │  3. file_complete ──────────────────► all chunks present?              │
//! │                                        yes: concatenate by index,      │
//! │                                             free the accumulator       │
//! │                                        no:  stay pending               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Receiver State Machine
//!
//! ```text
//!   Unknown ──metadata ok──► MetadataReceived ──chunk──► Accumulating
//!      │                                                      │
//!      │ metadata invalid                      complete, all  │
//!      ▼                                       chunks present ▼
//!   Rejected (terminal: every later frame                 Complete
//!   for this fileId is silently dropped)            (state evicted)
//! ```

mod receive;
mod send;

pub use receive::{TransferPhase, TransferRegistry};
pub use send::send_file;

/// Fixed chunk size: 256 KiB
pub const CHUNK_SIZE: usize = 256 * 1024;

/// Maximum number of chunks in one transfer.
///
/// Together with [`CHUNK_SIZE`] this caps any single transfer at 512 MiB.
/// An abuse-resistance limit, not a negotiable parameter.
pub const MAX_CHUNKS: u32 = 2048;

/// Maximum announced file size a receiver will accept
pub const MAX_FILE_SIZE: u64 = CHUNK_SIZE as u64 * MAX_CHUNKS as u64;
