//! # Transport Codec
//!
//! Converts binary [`SignedEnvelope`] values into the JSON-safe wire form
//! and back.
//!
//! The wrapped key, ciphertext, and signature travel as base64 text; the
//! nonce travels as a plain array of byte values. The mixed encoding is a
//! wire-compatibility requirement, not a choice this module gets to revisit.
//!
//! Round-trip law: `decode(&encode(x))? == x`, byte for byte, for every
//! valid envelope.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::crypto::{EncryptedEnvelope, Nonce, SignedEnvelope};
use crate::error::{Error, Result};

/// Text-safe mirror of a [`SignedEnvelope`]
///
/// Serializes to the wire JSON shape:
///
/// ```json
/// {
///   "encryptedPayload": {
///     "encryptedAESKey": "<base64>",
///     "encryptedAESPayload": { "iv": [1, 2, ...], "cipherText": "<base64>" }
///   },
///   "signature": "<base64>"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEnvelope {
    /// The encrypted payload portion
    #[serde(rename = "encryptedPayload")]
    pub encrypted_payload: WirePayload,
    /// Base64 of the RSA-PSS signature
    pub signature: String,
}

/// Wire form of the hybrid payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePayload {
    /// Base64 of the RSA-wrapped AES key
    #[serde(rename = "encryptedAESKey")]
    pub encrypted_aes_key: String,
    /// Wire form of the sealed payload
    #[serde(rename = "encryptedAESPayload")]
    pub encrypted_aes_payload: WireAesPayload,
}

/// Wire form of the AEAD-sealed portion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAesPayload {
    /// The nonce as an explicit array of byte values, exactly 12 entries
    pub iv: Vec<u8>,
    /// Base64 of the sealed payload, tag included
    #[serde(rename = "cipherText")]
    pub cipher_text: String,
}

/// Encode a signed envelope into its wire form
pub fn encode(signed: &SignedEnvelope) -> WireEnvelope {
    WireEnvelope {
        encrypted_payload: WirePayload {
            encrypted_aes_key: BASE64.encode(&signed.envelope.encrypted_key),
            encrypted_aes_payload: WireAesPayload {
                iv: signed.envelope.nonce.as_bytes().to_vec(),
                cipher_text: BASE64.encode(&signed.envelope.ciphertext),
            },
        },
        signature: BASE64.encode(&signed.signature),
    }
}

/// Decode a wire envelope back to its binary form
///
/// ## Errors
///
/// Fails with `MalformedWireData` on invalid base64 in any field or a nonce
/// array whose length is not 12.
pub fn decode(wire: &WireEnvelope) -> Result<SignedEnvelope> {
    let encrypted_key = BASE64
        .decode(&wire.encrypted_payload.encrypted_aes_key)
        .map_err(|e| Error::MalformedWireData(format!("invalid key base64: {}", e)))?;
    let ciphertext = BASE64
        .decode(&wire.encrypted_payload.encrypted_aes_payload.cipher_text)
        .map_err(|e| Error::MalformedWireData(format!("invalid ciphertext base64: {}", e)))?;
    let signature = BASE64
        .decode(&wire.signature)
        .map_err(|e| Error::MalformedWireData(format!("invalid signature base64: {}", e)))?;
    let nonce = Nonce::from_slice(&wire.encrypted_payload.encrypted_aes_payload.iv)?;

    Ok(SignedEnvelope {
        envelope: EncryptedEnvelope {
            encrypted_key,
            nonce,
            ciphertext,
        },
        signature,
    })
}

// ============================================================================
// TESTS
// ============================================================================
