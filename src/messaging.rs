//! # Chat Messaging
//!
//! Seals and opens single chat messages. Each message walks the full
//! pipeline on the way out (encrypt → sign → encode) and the inverse on the
//! way in (decode → verify → decrypt); routing, history, and retries belong
//! to the surrounding messaging layer.

use crate::crypto::{encrypt_and_sign, verify_and_decrypt};
use crate::error::{Error, Result};
use crate::identity::{Hand, PeerHand};
use crate::transport::{self, WireMessage};

/// Seal a chat message for a peer as a ready-to-send `message` frame
///
/// Fails with `InvalidKeyMaterial` if the sender is not registered yet (no
/// session id to put in `from`).
pub fn seal_chat(text: &str, from: &Hand, to: &PeerHand) -> Result<WireMessage> {
    let Some(from_id) = from.session_id.as_deref() else {
        return Err(Error::InvalidKeyMaterial(
            "sender has no session id".to_string(),
        ));
    };

    let signed = encrypt_and_sign(text, &to.encryption_key, &from.keys.signing)?;

    Ok(WireMessage::Message {
        from: from_id.to_string(),
        to: to.session_id.clone(),
        content: transport::encode(&signed),
    })
}

/// Open a received `message` frame
///
/// Verification failure is terminal for this frame but not for the session;
/// the caller simply moves on to the next one.
pub fn open_chat(msg: &WireMessage, receiver: &Hand, sender: &PeerHand) -> Result<String> {
    let WireMessage::Message { content, .. } = msg else {
        return Err(Error::MalformedWireData(
            "expected a message frame".to_string(),
        ));
    };

    let signed = transport::decode(content)?;
    verify_and_decrypt(&signed, &receiver.keys.encryption, &sender.signing_key)
}

// ============================================================================
// TESTS
// ============================================================================
