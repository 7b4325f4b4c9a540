//! Inbound side of the chunked transfer protocol.
//!
//! A [`TransferRegistry`] owns the accumulators for every in-flight
//! transfer, keyed by fileId. It is an explicit object passed by reference,
//! never a process-wide singleton; callers that handle frames from multiple
//! tasks put it behind their own synchronization, and `&mut self` keeps
//! each mutation of one transfer's chunk map serialized.

use std::collections::{BTreeMap, HashMap, HashSet};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::crypto::verify_and_decrypt;
use crate::error::{Error, Result};
use crate::identity::{Hand, PeerHand};
use crate::transfer::{MAX_CHUNKS, MAX_FILE_SIZE};
use crate::transport::{self, WireMessage};

/// Where a single transfer currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    /// Metadata validated and stored; no chunk has arrived yet
    MetadataReceived,
    /// At least one chunk stored
    Accumulating,
}

/// Accumulator for one in-flight transfer
#[derive(Debug)]
struct IncomingTransfer {
    /// Announced total size in bytes
    file_size: u64,
    /// Announced chunk count
    total_chunks: u32,
    /// Current phase
    phase: TransferPhase,
    /// Decrypted chunks by index; BTreeMap keeps finalization in index
    /// order, and inserting an existing index overwrites (last write wins)
    chunks: BTreeMap<u32, Vec<u8>>,
}

/// Per-session registry of in-flight and rejected transfers
///
/// Accumulators for different fileIds are fully independent; completing or
/// rejecting one never touches another. All state is in-memory only and
/// freed on completion.
#[derive(Debug, Default)]
pub struct TransferRegistry {
    pending: HashMap<String, IncomingTransfer>,
    rejected: HashSet<String>,
}

impl TransferRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transfers currently accumulating
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether a fileId has been permanently rejected
    pub fn is_rejected(&self, file_id: &str) -> bool {
        self.rejected.contains(file_id)
    }

    /// The phase of an in-flight transfer, if any
    pub fn phase(&self, file_id: &str) -> Option<TransferPhase> {
        self.pending.get(file_id).map(|t| t.phase)
    }

    /// Feed one inbound frame through the transfer state machine.
    ///
    /// Returns `Some(bytes)` exactly once per transfer: when a completion
    /// frame finds every chunk present. Chat frames and frames for unknown
    /// or rejected fileIds return `None`. A failed chunk (bad signature,
    /// bad payload) propagates its error but leaves the registry able to
    /// process further frames, for this transfer and every other.
    pub fn handle(
        &mut self,
        msg: &WireMessage,
        receiver: &Hand,
        sender: &PeerHand,
    ) -> Result<Option<Vec<u8>>> {
        match msg {
            WireMessage::Message { .. } => Ok(None),

            WireMessage::FileMetadata {
                file_id,
                file_size,
                total_chunks,
                ..
            } => self.handle_metadata(file_id, *file_size, *total_chunks),

            WireMessage::FileChunk {
                file_id,
                chunk_index,
                payload,
                ..
            } => self.handle_chunk(file_id, *chunk_index, payload, receiver, sender),

            WireMessage::FileComplete { file_id, .. } => self.handle_complete(file_id),
        }
    }

    fn handle_metadata(
        &mut self,
        file_id: &str,
        file_size: u64,
        total_chunks: u32,
    ) -> Result<Option<Vec<u8>>> {
        if self.rejected.contains(file_id) {
            return Ok(None);
        }

        let valid = is_uuid_like(file_id)
            && file_size <= MAX_FILE_SIZE
            && total_chunks > 0
            && total_chunks <= MAX_CHUNKS;

        if !valid {
            tracing::warn!(
                file_id = %file_id,
                file_size,
                total_chunks,
                "rejecting file metadata outside protocol bounds"
            );
            self.rejected.insert(file_id.to_string());
            return Err(Error::MetadataRejected(file_id.to_string()));
        }

        let entry = self
            .pending
            .entry(file_id.to_string())
            .or_insert_with(|| IncomingTransfer {
                file_size,
                total_chunks,
                phase: TransferPhase::MetadataReceived,
                chunks: BTreeMap::new(),
            });
        entry.file_size = file_size;
        entry.total_chunks = total_chunks;

        tracing::debug!(file_id = %file_id, file_size, total_chunks, "file metadata accepted");
        Ok(None)
    }

    fn handle_chunk(
        &mut self,
        file_id: &str,
        chunk_index: u32,
        payload: &transport::WireEnvelope,
        receiver: &Hand,
        sender: &PeerHand,
    ) -> Result<Option<Vec<u8>>> {
        if self.rejected.contains(file_id) {
            tracing::debug!(file_id = %file_id, "dropping chunk for rejected transfer");
            return Ok(None);
        }
        let Some(transfer) = self.pending.get_mut(file_id) else {
            tracing::debug!(file_id = %file_id, "ignoring chunk that arrived before metadata");
            return Ok(None);
        };

        let signed = transport::decode(payload)?;
        let chunk_b64 = verify_and_decrypt(&signed, &receiver.keys.encryption, &sender.signing_key)?;
        let chunk = BASE64
            .decode(chunk_b64)
            .map_err(|e| Error::MalformedWireData(format!("invalid chunk base64: {}", e)))?;

        transfer.chunks.insert(chunk_index, chunk);
        transfer.phase = TransferPhase::Accumulating;
        Ok(None)
    }

    fn handle_complete(&mut self, file_id: &str) -> Result<Option<Vec<u8>>> {
        if self.rejected.contains(file_id) {
            return Ok(None);
        }

        let complete = match self.pending.get(file_id) {
            None => return Ok(None),
            Some(transfer) => transfer.chunks.len() as u32 == transfer.total_chunks,
        };
        if !complete {
            tracing::debug!(file_id = %file_id, "completion before full chunk set, staying pending");
            return Ok(None);
        }

        let Some(transfer) = self.pending.remove(file_id) else {
            return Ok(None);
        };

        let actual: u64 = transfer.chunks.values().map(|c| c.len() as u64).sum();
        if actual != transfer.file_size {
            return Err(Error::ReassemblyMismatch {
                expected: transfer.file_size,
                actual,
            });
        }

        let mut buffer = Vec::with_capacity(transfer.file_size as usize);
        for chunk in transfer.chunks.into_values() {
            buffer.extend_from_slice(&chunk);
        }

        tracing::info!(file_id = %file_id, size = buffer.len(), "file transfer complete");
        Ok(Some(buffer))
    }
}

/// Check a fileId against the UUID shape: 36 chars of lowercase hex and
/// dashes
fn is_uuid_like(id: &str) -> bool {
    id.len() == 36
        && id
            .bytes()
            .all(|b| matches!(b, b'a'..=b'f' | b'0'..=b'9' | b'-'))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::encrypt_and_sign;
    use crate::transfer::{send_file, CHUNK_SIZE};
    use crate::transport::test_support::TestSink;
    use std::sync::OnceLock;

    const FILE_ID: &str = "1b9d6bcd-bbfd-4b2d-9b5d-ab8dfbbd4bed";

    fn sender() -> &'static Hand {
        static HAND: OnceLock<Hand> = OnceLock::new();
        HAND.get_or_init(|| {
            let mut hand = Hand::generate("Alice", None).unwrap();
            hand.session_id = Some("0a1b2c3d-4e5f-6071-8293-a4b5c6d7e8f9".to_string());
            hand
        })
    }

    fn receiver() -> &'static Hand {
        static HAND: OnceLock<Hand> = OnceLock::new();
        HAND.get_or_init(|| {
            let mut hand = Hand::generate("Bob", None).unwrap();
            hand.session_id = Some("f9e8d7c6-b5a4-9382-7160-5f4e3d2c1b0a".to_string());
            hand
        })
    }

    fn sender_profile() -> PeerHand {
        sender().public_profile().unwrap().unwrap()
    }

    fn receiver_profile() -> PeerHand {
        receiver().public_profile().unwrap().unwrap()
    }

    fn metadata_msg(file_id: &str, file_size: u64, total_chunks: u32) -> WireMessage {
        WireMessage::FileMetadata {
            from: "s".to_string(),
            to: "r".to_string(),
            file_id: file_id.to_string(),
            file_size,
            total_chunks,
        }
    }

    fn chunk_msg(file_id: &str, chunk_index: u32, bytes: &[u8]) -> WireMessage {
        let chunk_b64 = BASE64.encode(bytes);
        let signed = encrypt_and_sign(
            &chunk_b64,
            &receiver_profile().encryption_key,
            &sender().keys.signing,
        )
        .unwrap();
        WireMessage::FileChunk {
            from: "s".to_string(),
            to: "r".to_string(),
            file_id: file_id.to_string(),
            chunk_index,
            payload: transport::encode(&signed),
        }
    }

    fn complete_msg(file_id: &str) -> WireMessage {
        WireMessage::FileComplete {
            from: "s".to_string(),
            to: "r".to_string(),
            file_id: file_id.to_string(),
        }
    }

    fn handle(registry: &mut TransferRegistry, msg: &WireMessage) -> Result<Option<Vec<u8>>> {
        registry.handle(msg, receiver(), &sender_profile())
    }

    #[test]
    fn test_foobar_reassembly() {
        let mut registry = TransferRegistry::new();

        assert!(handle(&mut registry, &metadata_msg(FILE_ID, 6, 2)).unwrap().is_none());
        assert_eq!(registry.phase(FILE_ID), Some(TransferPhase::MetadataReceived));

        assert!(handle(&mut registry, &chunk_msg(FILE_ID, 0, b"foo")).unwrap().is_none());
        assert_eq!(registry.phase(FILE_ID), Some(TransferPhase::Accumulating));
        assert!(handle(&mut registry, &chunk_msg(FILE_ID, 1, b"bar")).unwrap().is_none());

        let assembled = handle(&mut registry, &complete_msg(FILE_ID)).unwrap().unwrap();
        assert_eq!(assembled, b"foobar");

        // Accumulator is evicted once finalized
        assert_eq!(registry.pending_count(), 0);
        assert!(registry.phase(FILE_ID).is_none());
    }

    #[test]
    fn test_out_of_order_chunks_reassemble_in_index_order() {
        let mut registry = TransferRegistry::new();

        handle(&mut registry, &metadata_msg(FILE_ID, 6, 2)).unwrap();
        handle(&mut registry, &chunk_msg(FILE_ID, 1, b"bar")).unwrap();
        handle(&mut registry, &chunk_msg(FILE_ID, 0, b"foo")).unwrap();

        let assembled = handle(&mut registry, &complete_msg(FILE_ID)).unwrap().unwrap();
        assert_eq!(assembled, b"foobar");
    }

    #[test]
    fn test_completion_before_full_chunk_set_stays_pending() {
        let mut registry = TransferRegistry::new();

        handle(&mut registry, &metadata_msg(FILE_ID, 6, 2)).unwrap();
        handle(&mut registry, &chunk_msg(FILE_ID, 0, b"foo")).unwrap();

        // Only 1 of 2 chunks present: no output, transfer stays pending
        assert!(handle(&mut registry, &complete_msg(FILE_ID)).unwrap().is_none());
        assert_eq!(registry.pending_count(), 1);

        // The missing chunk plus another completion finish the transfer
        handle(&mut registry, &chunk_msg(FILE_ID, 1, b"bar")).unwrap();
        let assembled = handle(&mut registry, &complete_msg(FILE_ID)).unwrap().unwrap();
        assert_eq!(assembled, b"foobar");
    }

    #[test]
    fn test_duplicate_chunk_last_write_wins() {
        let mut registry = TransferRegistry::new();

        handle(&mut registry, &metadata_msg(FILE_ID, 6, 2)).unwrap();
        handle(&mut registry, &chunk_msg(FILE_ID, 0, b"xxx")).unwrap();
        handle(&mut registry, &chunk_msg(FILE_ID, 0, b"foo")).unwrap();
        handle(&mut registry, &chunk_msg(FILE_ID, 1, b"bar")).unwrap();

        let assembled = handle(&mut registry, &complete_msg(FILE_ID)).unwrap().unwrap();
        assert_eq!(assembled, b"foobar");
    }

    #[test]
    fn test_chunk_before_metadata_is_ignored() {
        let mut registry = TransferRegistry::new();

        assert!(handle(&mut registry, &chunk_msg(FILE_ID, 0, b"foo")).unwrap().is_none());
        assert_eq!(registry.pending_count(), 0);

        // Completion for an unknown transfer is equally silent
        assert!(handle(&mut registry, &complete_msg(FILE_ID)).unwrap().is_none());
    }

    #[test]
    fn test_oversized_total_chunks_rejected_and_remembered() {
        let mut registry = TransferRegistry::new();

        let result = handle(&mut registry, &metadata_msg(FILE_ID, 6, MAX_CHUNKS + 1));
        assert!(matches!(result, Err(Error::MetadataRejected(_))));
        assert!(registry.is_rejected(FILE_ID));

        // Every later frame for this fileId is dropped without error
        assert!(handle(&mut registry, &chunk_msg(FILE_ID, 0, b"foo")).unwrap().is_none());
        assert!(handle(&mut registry, &complete_msg(FILE_ID)).unwrap().is_none());
        assert!(handle(&mut registry, &metadata_msg(FILE_ID, 6, 2)).unwrap().is_none());
        assert_eq!(registry.pending_count(), 0);
    }

    #[test]
    fn test_oversized_file_size_rejected() {
        let mut registry = TransferRegistry::new();

        let result = handle(&mut registry, &metadata_msg(FILE_ID, MAX_FILE_SIZE + 1, 2));
        assert!(matches!(result, Err(Error::MetadataRejected(_))));
    }

    #[test]
    fn test_zero_total_chunks_rejected() {
        let mut registry = TransferRegistry::new();

        let result = handle(&mut registry, &metadata_msg(FILE_ID, 0, 0));
        assert!(matches!(result, Err(Error::MetadataRejected(_))));
    }

    #[test]
    fn test_malformed_file_id_rejected() {
        let mut registry = TransferRegistry::new();

        for bad in ["", "not-a-uuid", "1B9D6BCD-BBFD-4B2D-9B5D-AB8DFBBD4BED"] {
            let result = handle(&mut registry, &metadata_msg(bad, 6, 2));
            assert!(matches!(result, Err(Error::MetadataRejected(_))), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_tampered_chunk_fails_without_poisoning_the_transfer() {
        let mut registry = TransferRegistry::new();
        handle(&mut registry, &metadata_msg(FILE_ID, 6, 2)).unwrap();

        let mut tampered = chunk_msg(FILE_ID, 0, b"foo");
        if let WireMessage::FileChunk { payload, .. } = &mut tampered {
            payload.signature = BASE64.encode([0u8; 256]);
        }

        let result = handle(&mut registry, &tampered);
        assert!(matches!(result, Err(Error::SignatureVerificationFailed)));

        // The session keeps going: valid chunks still complete the transfer
        handle(&mut registry, &chunk_msg(FILE_ID, 0, b"foo")).unwrap();
        handle(&mut registry, &chunk_msg(FILE_ID, 1, b"bar")).unwrap();
        let assembled = handle(&mut registry, &complete_msg(FILE_ID)).unwrap().unwrap();
        assert_eq!(assembled, b"foobar");
    }

    #[test]
    fn test_reassembly_size_mismatch() {
        let mut registry = TransferRegistry::new();

        handle(&mut registry, &metadata_msg(FILE_ID, 7, 2)).unwrap();
        handle(&mut registry, &chunk_msg(FILE_ID, 0, b"foo")).unwrap();
        handle(&mut registry, &chunk_msg(FILE_ID, 1, b"bar")).unwrap();

        let result = handle(&mut registry, &complete_msg(FILE_ID));
        assert!(matches!(
            result,
            Err(Error::ReassemblyMismatch { expected: 7, actual: 6 })
        ));
    }

    #[test]
    fn test_concurrent_transfers_do_not_interfere() {
        let other_id = "2c8e7fde-ccfe-4c3e-ac6e-bc9efccd5cfe";
        let mut registry = TransferRegistry::new();

        handle(&mut registry, &metadata_msg(FILE_ID, 3, 1)).unwrap();
        handle(&mut registry, &metadata_msg(other_id, 3, 1)).unwrap();
        handle(&mut registry, &chunk_msg(FILE_ID, 0, b"one")).unwrap();
        handle(&mut registry, &chunk_msg(other_id, 0, b"two")).unwrap();

        let first = handle(&mut registry, &complete_msg(FILE_ID)).unwrap().unwrap();
        assert_eq!(first, b"one");
        assert_eq!(registry.pending_count(), 1);

        let second = handle(&mut registry, &complete_msg(other_id)).unwrap().unwrap();
        assert_eq!(second, b"two");
    }

    #[test]
    fn test_chat_frames_pass_through_untouched() {
        let mut registry = TransferRegistry::new();
        let signed = encrypt_and_sign(
            "hello",
            &receiver_profile().encryption_key,
            &sender().keys.signing,
        )
        .unwrap();
        let msg = WireMessage::Message {
            from: "s".to_string(),
            to: "r".to_string(),
            content: transport::encode(&signed),
        };

        assert!(handle(&mut registry, &msg).unwrap().is_none());
        assert_eq!(registry.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_send_then_receive_round_trip() {
        let sink = TestSink::new();
        let data: Vec<u8> = (0..CHUNK_SIZE + 1234).map(|i| (i % 251) as u8).collect();

        send_file(&sink, sender(), &receiver_profile(), &data)
            .await
            .unwrap()
            .unwrap();

        let mut registry = TransferRegistry::new();
        let mut assembled = None;
        for frame in sink.sent_frames() {
            let msg = WireMessage::from_json(&frame).unwrap();
            if let Some(bytes) = handle(&mut registry, &msg).unwrap() {
                assembled = Some(bytes);
            }
        }

        assert_eq!(assembled.unwrap(), data);
        assert_eq!(registry.pending_count(), 0);
    }

    #[test]
    fn test_is_uuid_like() {
        assert!(is_uuid_like(FILE_ID));
        assert!(!is_uuid_like("short"));
        assert!(!is_uuid_like(&"g".repeat(36)));
    }
}
