//! # Cryptography Module
//!
//! All cryptographic primitives used by the Clasp core.
//!
//! ## Security Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRYPTOGRAPHIC ARCHITECTURE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 ENCRYPTION SCHEME                               │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  Hybrid Envelope (RSA-OAEP + AES-256-GCM)                      │   │
//! │  │  ─────────────────────────────────────────                      │   │
//! │  │                                                                 │   │
//! │  │  1. Fresh AES-256 key per message or file chunk                │   │
//! │  │                                                                 │   │
//! │  │  2. AES-256-GCM seal                                           │   │
//! │  │     • 256-bit key                                              │   │
//! │  │     • 96-bit nonce (random per call)                           │   │
//! │  │     • 128-bit authentication tag                               │   │
//! │  │                                                                 │   │
//! │  │  3. Key wrap: RSA-OAEP (SHA-256, 2048-bit modulus)             │   │
//! │  │     The wrapped key travels inside the envelope                │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 SIGNATURE SCHEME                                │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  RSA-PSS (SHA-256, 32-byte salt)                               │   │
//! │  │  ───────────────────────────────                                │   │
//! │  │                                                                 │   │
//! │  │  The signature covers a canonical serialization of the FULL    │   │
//! │  │  envelope, ciphertext included. Receivers verify before        │   │
//! │  │  decrypting; a failed check means the envelope never reaches   │   │
//! │  │  the cipher.                                                   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Algorithm Choices
//!
//! | Algorithm | Purpose | Notes |
//! |-----------|---------|-------|
//! | RSA-OAEP (SHA-256) | Key wrapping | 2048-bit modulus, e = 65537 |
//! | RSA-PSS (SHA-256) | Signatures | 32-byte salt |
//! | AES-256-GCM | Payload encryption | AEAD, random 96-bit nonces |
//!
//! ## Security Considerations
//!
//! 1. **Ephemeral keys**: A fresh symmetric key per message, zeroized on drop
//! 2. **Secure random**: `rand::rngs::OsRng` for keys, nonces, and salts
//! 3. **Usage restriction**: Imported public keys are encrypt-only or
//!    verify-only, enforced at the type level
//! 4. **Verify-then-decrypt**: Attacker-controlled ciphertext is never
//!    decrypted before its signature checks out

mod hybrid;
mod keys;
mod signing;
mod symmetric;

pub use hybrid::{hybrid_decrypt, hybrid_encrypt, EncryptedEnvelope};
pub use keys::{
    EncryptionKeyPair, PublicEncryptionKey, PublicSigningKey, SigningKeyPair, MODULUS_BITS,
    OAEP_OVERHEAD, PSS_SALT_LEN,
};
pub use signing::{
    canonical_bytes, encrypt_and_sign, sign, verify, verify_and_decrypt, SignedEnvelope,
};
pub use symmetric::{open, seal, Nonce, SymmetricKey, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
