//! # Clasp Core
//!
//! The end-to-end encryption core of the Clasp messenger: everything needed
//! to exchange confidential, authenticated messages and files between two
//! hands over an untrusted relay that only forwards opaque JSON frames.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         CLASP CORE MODULES                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────────────┐ │
//! │  │  Identity   │  │  Messaging  │  │          Transfer               │ │
//! │  │             │  │             │  │                                 │ │
//! │  │ - Hands     │  │ - Seal chat │  │ - Chunked send loop             │ │
//! │  │ - Key pairs │  │ - Open chat │  │ - Per-fileId reassembly         │ │
//! │  │ - Rotation  │  │             │  │ - Flow control via backlog      │ │
//! │  └──────┬──────┘  └──────┬──────┘  └──────────────┬──────────────────┘ │
//! │         │                │                        │                    │
//! │         └────────────────┴────────────────────────┘                    │
//! │                                   │                                     │
//! │  ┌─────────────────────┐  ┌───────────────────────────────────────────┐│
//! │  │       Crypto        │  │               Transport                   ││
//! │  │                     │  │                                           ││
//! │  │ - RSA-OAEP wrap     │  │ - WireEnvelope codec (base64/JSON)       ││
//! │  │ - RSA-PSS sign      │  │ - Tagged WireMessage union               ││
//! │  │ - AES-256-GCM seal  │  │ - FrameSink boundary + backlog drain     ││
//! │  └─────────────────────┘  └───────────────────────────────────────────┘│
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire crate
//! - [`crypto`] - Cryptographic primitives (keys, envelopes, signatures)
//! - [`identity`] - Hand identities and portable public profiles
//! - [`transport`] - Wire codec, message union, and the channel boundary
//! - [`transfer`] - Chunked file transfer state machines
//! - [`messaging`] - Chat message seal/open composition
//!
//! ## Data Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           MESSAGE PIPELINE                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Outbound:  plaintext ─► hybrid encrypt ─► PSS sign ─► wire encode     │
//! │             ─► JSON frame ─► FrameSink                                  │
//! │                                                                         │
//! │  Inbound:   JSON frame ─► wire decode ─► PSS verify ─► hybrid decrypt  │
//! │             (verification failure stops the pipeline before the        │
//! │              ciphertext ever reaches the cipher)                        │
//! │                                                                         │
//! │  Files add one stage on each side: chunk/encrypt per 256 KiB on the    │
//! │  way out, accumulate/reassemble by fileId on the way in.               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The core holds no global state: transfer registries and identities are
//! explicit values owned by the caller, and the network connection is an
//! injected [`transport::FrameSink`].

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod crypto;
pub mod error;
pub mod identity;
pub mod messaging;
pub mod transfer;
pub mod transport;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use crypto::{EncryptedEnvelope, SignedEnvelope};
pub use error::{Error, Result};
pub use identity::{Hand, PeerHand};
pub use transfer::TransferRegistry;
pub use transport::{FrameSink, WireEnvelope, WireMessage};

/// Returns the version of the Clasp core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================================
// TESTS
// ============================================================================
