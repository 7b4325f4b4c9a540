//! # Symmetric Cipher Module
//!
//! Provides AES-256-GCM for message and chunk confidentiality.
//!
//! ## Encryption Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SYMMETRIC SEAL / OPEN                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  seal(plaintext, key)                                                  │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  1. Draw a random 96-bit nonce from the OS CSPRNG            │       │
//! │  │  2. AES-256-GCM(key, nonce, plaintext)                       │       │
//! │  │  3. Output (nonce, ciphertext || 16-byte auth tag)           │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  open(ciphertext, key, nonce)                                          │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  AES-256-GCM-Decrypt; tag mismatch (wrong key, tampered     │       │
//! │  │  ciphertext, wrong nonce) fails as AuthenticationFailure    │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Lifetime
//!
//! Keys here are ephemeral: the hybrid layer generates a fresh one for every
//! message or file chunk, wraps it for the recipient, and drops it. Nothing
//! in this module persists or reuses a key, and key bytes are zeroized when
//! the `SymmetricKey` is dropped.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce as AesNonce,
};
use rand::RngCore;
use zeroize::ZeroizeOnDrop;

use crate::error::{Error, Result};

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Size of the symmetric key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// A nonce (number used once) for AES-GCM encryption
///
/// ## Critical Security Requirement
///
/// **NEVER reuse a nonce with the same key!**
///
/// Every `seal` call draws a fresh random nonce, and every key is used for
/// exactly one seal, so reuse cannot occur on the encrypt path. The decrypt
/// path accepts whatever nonce travelled with the envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce(pub [u8; NONCE_SIZE]);

impl Nonce {
    /// Generate a cryptographically random nonce
    pub fn random() -> Self {
        let mut bytes = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from existing bytes
    pub fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice (must be exactly 12 bytes)
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; NONCE_SIZE] = slice.try_into().map_err(|_| {
            Error::MalformedWireData(format!(
                "nonce must be {} bytes, got {}",
                NONCE_SIZE,
                slice.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// An ephemeral AES-256-GCM key
///
/// Zeroized when dropped.
#[derive(ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    /// Generate a fresh random key from the OS CSPRNG
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice (must be exactly 32 bytes)
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; KEY_SIZE] = slice.try_into().map_err(|_| {
            Error::InvalidKeyMaterial(format!(
                "symmetric key must be {} bytes, got {}",
                KEY_SIZE,
                slice.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Get the raw key bytes (for wrapping under a recipient's public key)
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Serialize the raw key bytes to a fixed-width lowercase hex string
    pub fn export_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Restore a key from its hex export. Round-trip exact.
    pub fn import_hex(hex_str: &str) -> Result<Self> {
        if hex_str.len() != KEY_SIZE * 2 {
            return Err(Error::InvalidKeyMaterial(format!(
                "key hex must be {} characters, got {}",
                KEY_SIZE * 2,
                hex_str.len()
            )));
        }
        let bytes = hex::decode(hex_str)
            .map_err(|e| Error::InvalidKeyMaterial(format!("invalid key hex: {}", e)))?;
        Self::from_slice(&bytes)
    }
}

/// Encrypt a payload using AES-256-GCM
///
/// A fresh random nonce is drawn per call; the returned ciphertext carries
/// the 16-byte authentication tag appended. No associated data is used.
///
/// ## Returns
///
/// Tuple of (nonce, ciphertext_with_tag)
pub fn seal(plaintext: &[u8], key: &SymmetricKey) -> Result<(Nonce, Vec<u8>)> {
    let nonce = Nonce::random();
    let cipher = Aes256Gcm::new_from_slice(&key.0)
        .map_err(|e| Error::InvalidKeyMaterial(format!("invalid AES key: {}", e)))?;

    let ciphertext = cipher
        .encrypt(AesNonce::from_slice(&nonce.0), plaintext)
        .map_err(|e| Error::EncryptionFailed(e.to_string()))?;

    Ok((nonce, ciphertext))
}

/// Decrypt a payload using AES-256-GCM
///
/// ## Errors
///
/// Returns `AuthenticationFailure` if the tag does not verify: the
/// ciphertext was tampered with, the key is wrong, or the nonce is wrong.
pub fn open(ciphertext: &[u8], key: &SymmetricKey, nonce: &Nonce) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(&key.0)
        .map_err(|e| Error::InvalidKeyMaterial(format!("invalid AES key: {}", e)))?;

    cipher
        .decrypt(AesNonce::from_slice(&nonce.0), ciphertext)
        .map_err(|_| Error::AuthenticationFailure)
}

// ============================================================================
// TESTS
// ============================================================================
