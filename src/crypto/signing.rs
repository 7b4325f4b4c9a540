//! # Digital Signatures Module
//!
//! Provides RSA-PSS signatures and the signed-hybrid message composition.
//!
//! ## Signing Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    SIGN-THEN-ENCRYPT COMPOSITION                        │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  SENDER                                                                │
//! │  ──────                                                                │
//! │  encrypt_and_sign(message, recipient_key_jwk, signing_pair)            │
//! │                                                                         │
//! │  1. Import the recipient key from its exported text form               │
//! │  2. hybrid_encrypt(message) → EncryptedEnvelope                        │
//! │  3. Canonically serialize the envelope (integer-array JSON,            │
//! │     deterministic field order, transport-independent)                  │
//! │  4. RSA-PSS sign the canonical bytes (SHA-256, 32-byte salt)           │
//! │                                                                         │
//! │  RECIPIENT                                                             │
//! │  ─────────                                                             │
//! │  verify_and_decrypt(signed, private_pair, sender_key_jwk)              │
//! │                                                                         │
//! │  1. Import the sender's verify key                                     │
//! │  2. Re-derive the identical canonical bytes                            │
//! │  3. Verify the signature FIRST                                         │
//! │     ✗ invalid → SignatureVerificationFailed, decryption is             │
//! │       never attempted                                                  │
//! │  4. hybrid_decrypt the envelope                                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Canonicalization Contract
//!
//! Sign and verify must produce byte-identical serializations. The canonical
//! form renders every buffer as an array of integer byte values, so any
//! base64 or hex re-encoding applied by the transport must be reversed to
//! the exact original bytes before re-serialization, or verification will
//! spuriously fail.

use rand::rngs::OsRng;
use rsa::Pss;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::crypto::hybrid::{self, EncryptedEnvelope};
use crate::crypto::keys::{EncryptionKeyPair, PublicEncryptionKey, PublicSigningKey, SigningKeyPair, PSS_SALT_LEN};
use crate::error::{Error, Result};

/// An envelope plus an RSA-PSS signature over its canonical serialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    /// The encrypted payload
    pub envelope: EncryptedEnvelope,
    /// PSS signature (SHA-256, 32-byte salt) over `canonical_bytes(envelope)`
    pub signature: Vec<u8>,
}

/// Sign a byte string with RSA-PSS (SHA-256 digest, 32-byte salt)
pub fn sign(data: &[u8], keypair: &SigningKeyPair) -> Result<Vec<u8>> {
    let digest = Sha256::digest(data);
    keypair
        .private_key()
        .sign_with_rng(
            &mut OsRng,
            Pss::new_with_salt::<Sha256>(PSS_SALT_LEN),
            digest.as_slice(),
        )
        .map_err(|e| Error::SigningFailed(e.to_string()))
}

/// Verify an RSA-PSS signature
///
/// Never errors on a bad signature: returns false. Malformed key material
/// is caught earlier, at import time.
pub fn verify(data: &[u8], signature: &[u8], key: &PublicSigningKey) -> bool {
    let digest = Sha256::digest(data);
    key.inner()
        .verify(
            Pss::new_with_salt::<Sha256>(PSS_SALT_LEN),
            digest.as_slice(),
            signature,
        )
        .is_ok()
}

// ============================================================================
// CANONICAL SERIALIZATION
// ============================================================================

// Serialized with serde's declared field order; serde_json renders byte
// slices as arrays of integers, which keeps the signed bytes independent of
// the transport's base64 encoding.
#[derive(Serialize)]
struct CanonicalEnvelope<'a> {
    #[serde(rename = "encryptedAESKey")]
    encrypted_key: &'a [u8],
    #[serde(rename = "encryptedAESPayload")]
    payload: CanonicalPayload<'a>,
}

#[derive(Serialize)]
struct CanonicalPayload<'a> {
    iv: &'a [u8],
    #[serde(rename = "cipherText")]
    ciphertext: &'a [u8],
}

/// Produce the canonical byte serialization of an envelope
///
/// The exact same bytes must come out on the sign side and the verify side.
pub fn canonical_bytes(envelope: &EncryptedEnvelope) -> Result<Vec<u8>> {
    let canonical = CanonicalEnvelope {
        encrypted_key: &envelope.encrypted_key,
        payload: CanonicalPayload {
            iv: envelope.nonce.as_bytes(),
            ciphertext: &envelope.ciphertext,
        },
    };
    Ok(serde_json::to_vec(&canonical)?)
}

// ============================================================================
// SIGNED-HYBRID OPERATIONS
// ============================================================================

/// Encrypt a message for a recipient and sign the resulting envelope
///
/// The recipient key arrives in its exported JWK text form, as carried over
/// the network; an empty or malformed key fails fast with
/// `InvalidKeyMaterial`.
pub fn encrypt_and_sign(
    message: &str,
    recipient_jwk: &str,
    signer: &SigningKeyPair,
) -> Result<SignedEnvelope> {
    let recipient = PublicEncryptionKey::from_jwk(recipient_jwk)?;
    let envelope = hybrid::hybrid_encrypt(message, &recipient)?;
    let signature = sign(&canonical_bytes(&envelope)?, signer)?;

    Ok(SignedEnvelope {
        envelope,
        signature,
    })
}

/// Verify a signed envelope and, only then, decrypt it
///
/// Verification happens strictly before decryption; on failure the envelope
/// is never fed to the cipher, and the terminal
/// `SignatureVerificationFailed` tells the caller to discard the message.
pub fn verify_and_decrypt(
    signed: &SignedEnvelope,
    recipient: &EncryptionKeyPair,
    sender_jwk: &str,
) -> Result<String> {
    let sender = PublicSigningKey::from_jwk(sender_jwk)?;
    let canonical = canonical_bytes(&signed.envelope)?;

    if !verify(&canonical, &signed.signature, &sender) {
        return Err(Error::SignatureVerificationFailed);
    }

    hybrid::hybrid_decrypt(&signed.envelope, recipient)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::symmetric::Nonce;
    use std::sync::OnceLock;

    fn signer() -> &'static SigningKeyPair {
        static PAIR: OnceLock<SigningKeyPair> = OnceLock::new();
        PAIR.get_or_init(|| SigningKeyPair::generate().unwrap())
    }

    fn recipient() -> &'static EncryptionKeyPair {
        static PAIR: OnceLock<EncryptionKeyPair> = OnceLock::new();
        PAIR.get_or_init(|| EncryptionKeyPair::generate().unwrap())
    }

    fn recipient_jwk() -> String {
        recipient().export_public_jwk().unwrap()
    }

    fn signer_jwk() -> String {
        signer().export_public_jwk().unwrap()
    }

    #[test]
    fn test_sign_verify() {
        let signature = sign(b"Hello, World!", signer()).unwrap();
        assert!(verify(b"Hello, World!", &signature, &signer().public_key()));
    }

    #[test]
    fn test_verify_wrong_message_returns_false() {
        let signature = sign(b"Hello, World!", signer()).unwrap();
        assert!(!verify(b"Wrong message!", &signature, &signer().public_key()));
    }

    #[test]
    fn test_verify_wrong_key_returns_false() {
        let other = SigningKeyPair::generate().unwrap();
        let signature = sign(b"Hello, World!", signer()).unwrap();
        assert!(!verify(b"Hello, World!", &signature, &other.public_key()));
    }

    #[test]
    fn test_verify_garbage_signature_returns_false() {
        // A bad signature must return false, never panic or error
        assert!(!verify(b"message", &[0u8; 256], &signer().public_key()));
        assert!(!verify(b"message", b"short", &signer().public_key()));
    }

    #[test]
    fn test_canonical_bytes_deterministic() {
        let envelope = EncryptedEnvelope {
            encrypted_key: vec![1, 2, 3],
            nonce: Nonce::from_bytes([7u8; 12]),
            ciphertext: vec![9, 8, 7],
        };
        assert_eq!(
            canonical_bytes(&envelope).unwrap(),
            canonical_bytes(&envelope).unwrap()
        );
    }

    #[test]
    fn test_canonical_bytes_shape() {
        let envelope = EncryptedEnvelope {
            encrypted_key: vec![0, 255],
            nonce: Nonce::from_bytes([1u8; 12]),
            ciphertext: vec![42],
        };
        let text = String::from_utf8(canonical_bytes(&envelope).unwrap()).unwrap();
        assert_eq!(
            text,
            "{\"encryptedAESKey\":[0,255],\"encryptedAESPayload\":\
             {\"iv\":[1,1,1,1,1,1,1,1,1,1,1,1],\"cipherText\":[42]}}"
        );
    }

    #[test]
    fn test_end_to_end_round_trip() {
        let signed = encrypt_and_sign("signed and sealed", &recipient_jwk(), signer()).unwrap();
        let plaintext = verify_and_decrypt(&signed, recipient(), &signer_jwk()).unwrap();
        assert_eq!(plaintext, "signed and sealed");
    }

    #[test]
    fn test_flipped_signature_bit_fails_verification() {
        let mut signed = encrypt_and_sign("tamper me", &recipient_jwk(), signer()).unwrap();
        signed.signature[0] ^= 0x01;

        let result = verify_and_decrypt(&signed, recipient(), &signer_jwk());
        assert!(matches!(result, Err(Error::SignatureVerificationFailed)));
    }

    #[test]
    fn test_flipped_ciphertext_bit_fails_before_decryption() {
        // The attacker alters the envelope without re-signing: the signature
        // still covers the original canonical bytes, so verification fails
        // and the cipher never sees the forged envelope.
        let mut signed = encrypt_and_sign("tamper me", &recipient_jwk(), signer()).unwrap();
        signed.envelope.ciphertext[0] ^= 0x01;

        let result = verify_and_decrypt(&signed, recipient(), &signer_jwk());
        assert!(matches!(result, Err(Error::SignatureVerificationFailed)));
    }

    #[test]
    fn test_flipped_wrapped_key_bit_fails_before_decryption() {
        let mut signed = encrypt_and_sign("tamper me", &recipient_jwk(), signer()).unwrap();
        signed.envelope.encrypted_key[10] ^= 0x80;

        let result = verify_and_decrypt(&signed, recipient(), &signer_jwk());
        assert!(matches!(result, Err(Error::SignatureVerificationFailed)));
    }

    #[test]
    fn test_empty_recipient_key_fails_fast() {
        let result = encrypt_and_sign("message", "", signer());
        assert!(matches!(result, Err(Error::InvalidKeyMaterial(_))));
    }

    #[test]
    fn test_empty_sender_key_fails_fast() {
        let signed = encrypt_and_sign("message", &recipient_jwk(), signer()).unwrap();
        let result = verify_and_decrypt(&signed, recipient(), "");
        assert!(matches!(result, Err(Error::InvalidKeyMaterial(_))));
    }
}
