//! # Hybrid Encryption Module
//!
//! Combines the asymmetric and symmetric ciphers into a single envelope.
//!
//! ## Encryption Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       HYBRID ENCRYPTION FLOW                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  hybrid_encrypt(message, recipient_public_key)                         │
//! │                                                                         │
//! │  1. Generate a fresh AES-256 key (never reused, even for the           │
//! │     same recipient)                                                    │
//! │  2. seal(utf8(message)) under that key → (nonce, ciphertext)           │
//! │  3. RSA-OAEP-encrypt the raw key bytes under the recipient key         │
//! │  4. Envelope = { wrapped key, nonce, ciphertext }                      │
//! │                                                                         │
//! │  hybrid_decrypt(envelope, recipient_private_key)                       │
//! │                                                                         │
//! │  1. RSA-OAEP-decrypt the wrapped key                                   │
//! │  2. open(ciphertext) with the carried nonce                            │
//! │  3. Decode UTF-8                                                       │
//! │                                                                         │
//! │  Either failure surfaces as the single opaque DecryptionFailure:       │
//! │  callers never learn whether the key unwrap or the AEAD open failed.   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::crypto::keys::{EncryptionKeyPair, PublicEncryptionKey};
use crate::crypto::symmetric::{self, Nonce, SymmetricKey};
use crate::error::{Error, Result};

/// An encrypted envelope: a symmetric-key-wrapped-under-RSA plus the
/// AEAD-sealed payload
///
/// ## Invariants
///
/// - `nonce` is exactly 12 bytes (enforced by the [`Nonce`] type)
/// - `ciphertext` carries the 16-byte GCM authentication tag appended,
///   consistently between encrypt and decrypt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    /// The ephemeral AES key, RSA-OAEP-encrypted under the recipient's
    /// public encryption key
    pub encrypted_key: Vec<u8>,
    /// The AES-GCM nonce used to seal `ciphertext`
    pub nonce: Nonce,
    /// The sealed payload, authentication tag included
    pub ciphertext: Vec<u8>,
}

/// Encrypt a message for a recipient
///
/// Every call generates a fresh symmetric key; nothing is shared between
/// calls, even for the same recipient.
pub fn hybrid_encrypt(
    message: &str,
    recipient: &PublicEncryptionKey,
) -> Result<EncryptedEnvelope> {
    let key = SymmetricKey::generate();
    let (nonce, ciphertext) = symmetric::seal(message.as_bytes(), &key)?;
    let encrypted_key = recipient.encrypt(key.as_bytes())?;

    Ok(EncryptedEnvelope {
        encrypted_key,
        nonce,
        ciphertext,
    })
}

/// Decrypt an envelope addressed to us
///
/// ## Errors
///
/// Returns `DecryptionFailure` whether the key unwrap or the AEAD open
/// failed; the two causes are indistinguishable to the caller.
pub fn hybrid_decrypt(
    envelope: &EncryptedEnvelope,
    recipient: &EncryptionKeyPair,
) -> Result<String> {
    let raw_key = recipient
        .decrypt(&envelope.encrypted_key)
        .map_err(|_| Error::DecryptionFailure)?;
    let key = SymmetricKey::from_slice(&raw_key).map_err(|_| Error::DecryptionFailure)?;

    let plaintext = symmetric::open(&envelope.ciphertext, &key, &envelope.nonce)
        .map_err(|_| Error::DecryptionFailure)?;

    String::from_utf8(plaintext).map_err(|_| Error::DecryptionFailure)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn recipient() -> &'static EncryptionKeyPair {
        static PAIR: OnceLock<EncryptionKeyPair> = OnceLock::new();
        PAIR.get_or_init(|| EncryptionKeyPair::generate().unwrap())
    }

    #[test]
    fn test_hybrid_round_trip() {
        let pair = recipient();
        let envelope = hybrid_encrypt("Secret message for Bob", &pair.public_key()).unwrap();
        let decrypted = hybrid_decrypt(&envelope, pair).unwrap();
        assert_eq!(decrypted, "Secret message for Bob");
    }

    #[test]
    fn test_hybrid_round_trip_unicode() {
        let pair = recipient();
        let envelope = hybrid_encrypt("héllo wörld 🤝", &pair.public_key()).unwrap();
        assert_eq!(hybrid_decrypt(&envelope, pair).unwrap(), "héllo wörld 🤝");
    }

    #[test]
    fn test_no_key_reuse_across_calls() {
        let pair = recipient();
        let a = hybrid_encrypt("same message", &pair.public_key()).unwrap();
        let b = hybrid_encrypt("same message", &pair.public_key()).unwrap();

        assert_ne!(a.encrypted_key, b.encrypted_key);
        assert_ne!(a.ciphertext, b.ciphertext);
        assert_ne!(a.nonce, b.nonce);
    }

    #[test]
    fn test_wrong_recipient_fails_opaquely() {
        let pair = recipient();
        let other = EncryptionKeyPair::generate().unwrap();
        let envelope = hybrid_encrypt("secret", &pair.public_key()).unwrap();

        let result = hybrid_decrypt(&envelope, &other);
        assert!(matches!(result, Err(Error::DecryptionFailure)));
    }

    #[test]
    fn test_tampered_ciphertext_fails_opaquely() {
        let pair = recipient();
        let mut envelope = hybrid_encrypt("secret", &pair.public_key()).unwrap();
        envelope.ciphertext[0] ^= 0x01;

        // The AEAD failure is not distinguishable from a key unwrap failure
        let result = hybrid_decrypt(&envelope, pair);
        assert!(matches!(result, Err(Error::DecryptionFailure)));
    }

    #[test]
    fn test_tampered_wrapped_key_fails_opaquely() {
        let pair = recipient();
        let mut envelope = hybrid_encrypt("secret", &pair.public_key()).unwrap();
        let last = envelope.encrypted_key.len() - 1;
        envelope.encrypted_key[last] ^= 0x01;

        let result = hybrid_decrypt(&envelope, pair);
        assert!(matches!(result, Err(Error::DecryptionFailure)));
    }
}
