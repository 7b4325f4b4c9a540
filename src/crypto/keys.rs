//! # Key Management
//!
//! This module handles asymmetric key generation, portable export, and the
//! RSA-OAEP cipher operations.
//!
//! ## Key Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          KEY TYPES                                      │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  EncryptionKeyPair (RSA-OAEP, SHA-256)                          │   │
//! │  │  ─────────────────────────────────────                           │   │
//! │  │                                                                  │   │
//! │  │  Purpose:                                                       │   │
//! │  │  • Wrapping ephemeral AES keys for a recipient                  │   │
//! │  │  • Unwrapping AES keys addressed to us                          │   │
//! │  │                                                                  │   │
//! │  │  The OAEP padding limit caps one block at modulus − 66 bytes,   │   │
//! │  │  so this pair only ever carries symmetric keys, never payloads. │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SigningKeyPair (RSA-PSS, SHA-256, 32-byte salt)                │   │
//! │  │  ───────────────────────────────────────────────                 │   │
//! │  │                                                                  │   │
//! │  │  Purpose:                                                       │   │
//! │  │  • Signing canonical envelope serializations                    │   │
//! │  │  • Letting peers verify authorship before decrypting            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Portable Export
//!
//! Public keys cross the network boundary only as JSON Web Key text tagged
//! with the algorithm family (`RSA-OAEP-256` or `PS256`) and a restricted
//! `key_ops` list. Importing yields a usage-restricted type:
//! [`PublicEncryptionKey`] can only encrypt, [`PublicSigningKey`] can only
//! verify. A key exported for one purpose cannot be imported for the other.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::rngs::OsRng;
use rsa::{traits::PublicKeyParts, BigUint, Oaep, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use crate::error::{Error, Result};

/// RSA modulus size in bits.
///
/// Fixed policy: the 3072-bit variant seen in an earlier iteration of the
/// scheme is deprecated and not accepted.
pub const MODULUS_BITS: usize = 2048;

/// OAEP padding overhead in bytes for SHA-256: 2 * 32 + 2
pub const OAEP_OVERHEAD: usize = 66;

/// PSS salt length in bytes
pub const PSS_SALT_LEN: usize = 32;

/// JWK `alg` tag for encryption keys
const ALG_ENCRYPTION: &str = "RSA-OAEP-256";

/// JWK `alg` tag for signing keys
const ALG_SIGNING: &str = "PS256";

// ============================================================================
// KEY PAIRS
// ============================================================================

/// RSA-OAEP key pair for confidentiality
///
/// Generated once per identity and replaced wholesale on key rotation;
/// never mutated in place.
#[derive(ZeroizeOnDrop)]
pub struct EncryptionKeyPair {
    /// Private key (secret)
    #[zeroize(skip)] // rsa::RsaPrivateKey zeroizes its own storage on drop
    private: RsaPrivateKey,
    /// Public key (derived from the private key)
    #[zeroize(skip)]
    public: RsaPublicKey,
}

impl EncryptionKeyPair {
    /// Generate a new 2048-bit RSA-OAEP pair with public exponent 65537
    pub fn generate() -> Result<Self> {
        let private = RsaPrivateKey::new(&mut OsRng, MODULUS_BITS)
            .map_err(|e| Error::InvalidKeyMaterial(format!("RSA key generation failed: {}", e)))?;
        let public = RsaPublicKey::from(&private);
        Ok(Self { private, public })
    }

    /// Get the public half as a usage-restricted encrypt-only key
    pub fn public_key(&self) -> PublicEncryptionKey {
        PublicEncryptionKey(self.public.clone())
    }

    /// Export the public key as portable JWK text
    pub fn export_public_jwk(&self) -> Result<String> {
        export_jwk(&self.public, ALG_ENCRYPTION, "encrypt")
    }

    /// RSA-OAEP decrypt a wrapped payload
    ///
    /// ## Errors
    ///
    /// Returns the opaque `DecryptionFailure` on any padding mismatch.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.private
            .decrypt(Oaep::new::<Sha256>(), ciphertext)
            .map_err(|_| Error::DecryptionFailure)
    }
}

/// RSA-PSS key pair for signatures
#[derive(ZeroizeOnDrop)]
pub struct SigningKeyPair {
    /// Private key (secret)
    #[zeroize(skip)] // rsa::RsaPrivateKey zeroizes its own storage on drop
    private: RsaPrivateKey,
    /// Public key (derived from the private key)
    #[zeroize(skip)]
    public: RsaPublicKey,
}

impl SigningKeyPair {
    /// Generate a new 2048-bit RSA-PSS pair with public exponent 65537
    pub fn generate() -> Result<Self> {
        let private = RsaPrivateKey::new(&mut OsRng, MODULUS_BITS)
            .map_err(|e| Error::InvalidKeyMaterial(format!("RSA key generation failed: {}", e)))?;
        let public = RsaPublicKey::from(&private);
        Ok(Self { private, public })
    }

    /// Get the public half as a usage-restricted verify-only key
    pub fn public_key(&self) -> PublicSigningKey {
        PublicSigningKey(self.public.clone())
    }

    /// Export the public key as portable JWK text
    pub fn export_public_jwk(&self) -> Result<String> {
        export_jwk(&self.public, ALG_SIGNING, "verify")
    }

    /// Get a reference to the private key for signing
    pub(crate) fn private_key(&self) -> &RsaPrivateKey {
        &self.private
    }
}

// ============================================================================
// USAGE-RESTRICTED PUBLIC KEYS
// ============================================================================

/// An imported public key that can only encrypt
///
/// Obtained from a JWK tagged `RSA-OAEP-256`; there is no way to verify
/// signatures with this type, which rules out usage-confusion misuse.
#[derive(Clone, Debug)]
pub struct PublicEncryptionKey(RsaPublicKey);

impl PublicEncryptionKey {
    /// Import from exported JWK text
    ///
    /// Fails with `InvalidKeyMaterial` for empty input, a non-RSA key, a
    /// mismatched `alg` tag, or a `key_ops` list that does not allow
    /// encryption.
    pub fn from_jwk(jwk: &str) -> Result<Self> {
        import_jwk(jwk, ALG_ENCRYPTION, "encrypt").map(Self)
    }

    /// Re-export as JWK text
    pub fn to_jwk(&self) -> Result<String> {
        export_jwk(&self.0, ALG_ENCRYPTION, "encrypt")
    }

    /// RSA-OAEP encrypt a small payload
    ///
    /// Input must fit a single OAEP block (modulus − 66 bytes); anything
    /// larger fails with `PayloadTooLarge`. This bounds the asymmetric
    /// cipher to wrapping symmetric keys.
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        let max = self.0.size() - OAEP_OVERHEAD;
        if data.len() > max {
            return Err(Error::PayloadTooLarge {
                len: data.len(),
                max,
            });
        }
        self.0
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), data)
            .map_err(|e| Error::EncryptionFailed(e.to_string()))
    }
}

/// An imported public key that can only verify signatures
#[derive(Clone, Debug)]
pub struct PublicSigningKey(RsaPublicKey);

impl PublicSigningKey {
    /// Import from exported JWK text
    ///
    /// Fails with `InvalidKeyMaterial` for empty input, a non-RSA key, a
    /// mismatched `alg` tag, or a `key_ops` list that does not allow
    /// verification.
    pub fn from_jwk(jwk: &str) -> Result<Self> {
        import_jwk(jwk, ALG_SIGNING, "verify").map(Self)
    }

    /// Re-export as JWK text
    pub fn to_jwk(&self) -> Result<String> {
        export_jwk(&self.0, ALG_SIGNING, "verify")
    }

    /// Get a reference to the underlying key for verification
    pub(crate) fn inner(&self) -> &RsaPublicKey {
        &self.0
    }
}

// ============================================================================
// JWK SERIALIZATION
// ============================================================================

/// Portable public-key text format: a JSON Web Key restricted to one usage
#[derive(Serialize, Deserialize)]
struct Jwk {
    kty: String,
    n: String,
    e: String,
    alg: String,
    key_ops: Vec<String>,
    ext: bool,
}

fn export_jwk(key: &RsaPublicKey, alg: &str, op: &str) -> Result<String> {
    let jwk = Jwk {
        kty: "RSA".to_string(),
        n: URL_SAFE_NO_PAD.encode(key.n().to_bytes_be()),
        e: URL_SAFE_NO_PAD.encode(key.e().to_bytes_be()),
        alg: alg.to_string(),
        key_ops: vec![op.to_string()],
        ext: true,
    };
    Ok(serde_json::to_string(&jwk)?)
}

fn import_jwk(text: &str, expected_alg: &str, expected_op: &str) -> Result<RsaPublicKey> {
    if text.is_empty() {
        return Err(Error::InvalidKeyMaterial("empty exported key".to_string()));
    }

    let jwk: Jwk = serde_json::from_str(text)
        .map_err(|e| Error::InvalidKeyMaterial(format!("unparseable JWK: {}", e)))?;

    if jwk.kty != "RSA" {
        return Err(Error::InvalidKeyMaterial(format!(
            "unsupported key type {}",
            jwk.kty
        )));
    }
    if jwk.alg != expected_alg {
        return Err(Error::InvalidKeyMaterial(format!(
            "key tagged {} cannot be imported as {}",
            jwk.alg, expected_alg
        )));
    }
    if !jwk.key_ops.iter().any(|op| op == expected_op) {
        return Err(Error::InvalidKeyMaterial(format!(
            "key does not permit the {} operation",
            expected_op
        )));
    }

    let n = URL_SAFE_NO_PAD
        .decode(&jwk.n)
        .map_err(|e| Error::InvalidKeyMaterial(format!("invalid modulus encoding: {}", e)))?;
    let e = URL_SAFE_NO_PAD
        .decode(&jwk.e)
        .map_err(|e| Error::InvalidKeyMaterial(format!("invalid exponent encoding: {}", e)))?;

    RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e))
        .map_err(|e| Error::InvalidKeyMaterial(format!("invalid RSA public key: {}", e)))
}

// ============================================================================
// TESTS
// ============================================================================
