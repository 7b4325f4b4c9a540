//! # Error Handling
//!
//! Error types for the Clasp encryption core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Crypto Errors                                                     │
//! │  │   ├── AuthenticationFailure       - AEAD tag did not verify         │
//! │  │   ├── DecryptionFailure           - Key unwrap or AEAD open failed  │
//! │  │   ├── EncryptionFailed            - Cipher engine rejected input    │
//! │  │   ├── SignatureVerificationFailed - Signature check failed          │
//! │  │   ├── SigningFailed               - Signature could not be produced │
//! │  │   ├── InvalidKeyMaterial          - Missing or unusable key input   │
//! │  │   └── PayloadTooLarge             - Exceeds the RSA-OAEP bound      │
//! │  │                                                                      │
//! │  ├── Codec Errors                                                      │
//! │  │   └── MalformedWireData           - Bad base64, nonce, or tag       │
//! │  │                                                                      │
//! │  └── Transfer Errors                                                   │
//! │      ├── MetadataRejected            - Metadata outside bounds         │
//! │      ├── ReassemblyMismatch          - Chunks do not fill the file     │
//! │      └── ChannelClosed               - Sink closed mid-operation       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cryptographic and codec failures are reported to the caller and never
//! retried inside the core; any retry policy belongs to the messaging layer.
//! A failure on one message leaves the session able to process the next
//! message independently.

use thiserror::Error;

/// Result type alias for Clasp core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Clasp encryption core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Crypto Errors
    // ========================================================================

    /// AEAD authentication tag did not verify (wrong key, tampered
    /// ciphertext, or wrong nonce)
    #[error("Authentication failed: ciphertext or tag rejected")]
    AuthenticationFailure,

    /// Asymmetric key unwrap or AEAD open failed. Both causes collapse into
    /// this one variant; callers cannot distinguish a bad wrapped key from
    /// bad ciphertext.
    #[error("Decryption failed")]
    DecryptionFailure,

    /// The cipher engine rejected an encryption input
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Signature did not verify against the sender's public signing key.
    /// Terminal: the message must be discarded, never retried.
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Producing a signature failed inside the cipher engine
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Key argument was empty, malformed, or tagged for the wrong usage.
    /// A programming error at the call site; fail fast.
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Input exceeds what a single RSA-OAEP block can carry. The asymmetric
    /// cipher wraps symmetric keys, never bulk data.
    #[error("Payload of {len} bytes exceeds the RSA-OAEP limit of {max} bytes")]
    PayloadTooLarge {
        /// Length of the rejected input
        len: usize,
        /// Maximum length a single OAEP block admits
        max: usize,
    },

    // ========================================================================
    // Codec Errors
    // ========================================================================

    /// Wire data could not be decoded: invalid base64, a nonce array of the
    /// wrong length, or an unknown message `type` tag
    #[error("Malformed wire data: {0}")]
    MalformedWireData(String),

    // ========================================================================
    // Transfer Errors
    // ========================================================================

    /// File metadata failed validation. The fileId is remembered and every
    /// later chunk or completion message for it is silently dropped; the
    /// sender is not notified.
    #[error("File metadata rejected for transfer {0}")]
    MetadataRejected(String),

    /// The accumulated chunks do not exactly fill the announced file size
    #[error("Reassembled {actual} bytes but metadata announced {expected}")]
    ReassemblyMismatch {
        /// Byte count announced in the metadata message
        expected: u64,
        /// Byte count actually accumulated across chunks
        actual: u64,
    },

    /// The outbound channel closed while an operation was waiting on it
    #[error("Channel closed")]
    ChannelClosed,

    // ========================================================================
    // Internal Errors
    // ========================================================================

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Check if this error is terminal for the message that caused it.
    ///
    /// Terminal errors mean the payload must be discarded; retrying with the
    /// same bytes can never succeed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Error::AuthenticationFailure
                | Error::DecryptionFailure
                | Error::SignatureVerificationFailed
                | Error::MetadataRejected(_)
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_errors() {
        assert!(Error::SignatureVerificationFailed.is_terminal());
        assert!(Error::AuthenticationFailure.is_terminal());
        assert!(Error::MetadataRejected("f-1".into()).is_terminal());
        assert!(!Error::ChannelClosed.is_terminal());
        assert!(!Error::MalformedWireData("bad base64".into()).is_terminal());
    }

    #[test]
    fn test_error_display() {
        let err = Error::PayloadTooLarge { len: 300, max: 190 };
        let msg = err.to_string();
        assert!(msg.contains("300"));
        assert!(msg.contains("190"));
    }
}
