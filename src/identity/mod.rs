//! # Identity Module
//!
//! A participant in a conversation is a "hand": a display profile plus two
//! independent RSA key pairs.
//!
//! ## Identity Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         HAND IDENTITY                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Cryptographic Identity                                         │   │
//! │  │  ───────────────────────                                         │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────────────────┐   ┌─────────────────────┐             │   │
//! │  │  │ Encryption KeyPair  │   │ Signing KeyPair     │             │   │
//! │  │  │ (RSA-OAEP)          │   │ (RSA-PSS)           │             │   │
//! │  │  │                     │   │                     │             │   │
//! │  │  │ • Receive messages  │   │ • Prove authorship  │             │   │
//! │  │  │ • Unwrap AES keys   │   │ • Sign envelopes    │             │   │
//! │  │  └─────────────────────┘   └─────────────────────┘             │   │
//! │  │                                                                 │   │
//! │  │  Generated once per identity, never mutated; key rotation      │   │
//! │  │  replaces both pairs wholesale.                                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Profile                                                        │   │
//! │  │  ─────────                                                       │   │
//! │  │                                                                 │   │
//! │  │  • Display Name: "Alice"                                        │   │
//! │  │  • Avatar URL: (optional)                                       │   │
//! │  │  • Session id: assigned by the registration service             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the public halves ever leave this process, and they travel as
//! exported JWK text inside a [`PeerHand`], never as live key handles.

use serde::{Deserialize, Serialize};

use crate::crypto::{EncryptionKeyPair, SigningKeyPair};
use crate::error::Result;

/// The two key pairs backing one identity
pub struct HandKeys {
    /// RSA-OAEP pair for confidentiality
    pub encryption: EncryptionKeyPair,
    /// RSA-PSS pair for signatures
    pub signing: SigningKeyPair,
}

impl HandKeys {
    /// Generate both pairs
    pub fn generate() -> Result<Self> {
        Ok(Self {
            encryption: EncryptionKeyPair::generate()?,
            signing: SigningKeyPair::generate()?,
        })
    }
}

/// A local participant identity: profile plus private key material
pub struct Hand {
    /// Name shown to peers
    pub display_name: String,
    /// Optional avatar image URL
    pub avatar_url: Option<String>,
    /// Session identifier assigned by the registration service; `None`
    /// until registration completes
    pub session_id: Option<String>,
    /// Private key material; never serialized
    pub keys: HandKeys,
}

impl Hand {
    /// Create a new identity with freshly generated key pairs
    pub fn generate(display_name: impl Into<String>, avatar_url: Option<String>) -> Result<Self> {
        Ok(Self {
            display_name: display_name.into(),
            avatar_url,
            session_id: None,
            keys: HandKeys::generate()?,
        })
    }

    /// Replace both key pairs wholesale.
    ///
    /// After rotation, peers must receive the new public material (via a
    /// fresh [`PeerHand`]) before they can decrypt or verify anything sent
    /// with the new keys. The agreement handshake around that exchange is
    /// the messaging layer's concern.
    pub fn rotate_keys(&mut self) -> Result<()> {
        self.keys = HandKeys::generate()?;
        tracing::info!(hand = %self.display_name, "rotated identity key pairs");
        Ok(())
    }

    /// Export the shareable half of this identity
    ///
    /// Requires a session id, i.e. a completed registration.
    pub fn public_profile(&self) -> Result<Option<PeerHand>> {
        let Some(session_id) = &self.session_id else {
            return Ok(None);
        };
        Ok(Some(PeerHand {
            session_id: session_id.clone(),
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
            encryption_key: self.keys.encryption.export_public_jwk()?,
            signing_key: self.keys.signing.export_public_jwk()?,
        }))
    }
}

/// The public, portable view of a peer's identity
///
/// This is what the registration service distributes: profile fields plus
/// both public keys as exported JWK text. It is safe to serialize, store,
/// and forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerHand {
    /// Session identifier assigned by the registration service
    pub session_id: String,
    /// Name shown to peers
    pub display_name: String,
    /// Optional avatar image URL
    pub avatar_url: Option<String>,
    /// Public encryption key as exported JWK text (`RSA-OAEP-256`)
    pub encryption_key: String,
    /// Public signing key as exported JWK text (`PS256`)
    pub signing_key: String,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{encrypt_and_sign, verify_and_decrypt, PublicEncryptionKey};
    use std::sync::OnceLock;

    fn registered_hand() -> &'static Hand {
        static HAND: OnceLock<Hand> = OnceLock::new();
        HAND.get_or_init(|| {
            let mut hand = Hand::generate("Alice", None).unwrap();
            hand.session_id = Some("3f2c1d6a-9b4e-4f7a-8c2d-5e6f7a8b9c0d".to_string());
            hand
        })
    }

    #[test]
    fn test_public_profile_requires_registration() {
        let hand = Hand::generate("Bob", None).unwrap();
        assert!(hand.public_profile().unwrap().is_none());
    }

    #[test]
    fn test_public_profile_carries_both_keys() {
        let profile = registered_hand().public_profile().unwrap().unwrap();

        assert_eq!(profile.display_name, "Alice");
        assert!(PublicEncryptionKey::from_jwk(&profile.encryption_key).is_ok());
        assert!(profile.signing_key.contains("PS256"));
    }

    #[test]
    fn test_peer_hand_serde_round_trip() {
        let profile = registered_hand().public_profile().unwrap().unwrap();

        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"sessionId\""));
        assert!(json.contains("\"displayName\""));
        assert!(json.contains("\"encryptionKey\""));

        let restored: PeerHand = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, profile);
    }

    #[test]
    fn test_rotation_replaces_both_pairs() {
        let mut hand = Hand::generate("Carol", None).unwrap();
        hand.session_id = Some("11111111-2222-3333-4444-555555555555".to_string());

        let before = hand.public_profile().unwrap().unwrap();
        hand.rotate_keys().unwrap();
        let after = hand.public_profile().unwrap().unwrap();

        assert_ne!(before.encryption_key, after.encryption_key);
        assert_ne!(before.signing_key, after.signing_key);
    }

    #[test]
    fn test_messages_to_old_keys_fail_after_rotation() {
        let mut receiver = Hand::generate("Dave", None).unwrap();
        receiver.session_id = Some("aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee".to_string());
        let sender = registered_hand();

        let old_profile = receiver.public_profile().unwrap().unwrap();
        let signed =
            encrypt_and_sign("for the old keys", &old_profile.encryption_key, &sender.keys.signing)
                .unwrap();

        receiver.rotate_keys().unwrap();

        let sender_jwk = sender.keys.signing.export_public_jwk().unwrap();
        let result = verify_and_decrypt(&signed, &receiver.keys.encryption, &sender_jwk);
        assert!(result.is_err());
    }
}
