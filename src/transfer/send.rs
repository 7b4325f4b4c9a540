//! Outbound side of the chunked transfer protocol.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use uuid::Uuid;

use crate::crypto::encrypt_and_sign;
use crate::error::Result;
use crate::identity::{Hand, PeerHand};
use crate::transfer::CHUNK_SIZE;
use crate::transport::{self, drain_backlog, FrameSink, WireMessage};

/// Send a file to a peer as a metadata/chunks/complete frame sequence.
///
/// Each chunk's raw bytes are base64-encoded before entering the
/// string-oriented encryption path, then encrypted and signed exactly like a
/// chat message. Before every chunk frame the sink's backlog is drained so a
/// slow peer cannot force unbounded buffering.
///
/// Returns the generated fileId, or `None` without sending anything when
/// the sink is closed or the sender has no session id yet. Partial
/// metadata is never emitted.
pub async fn send_file<S: FrameSink + ?Sized>(
    sink: &S,
    from: &Hand,
    to: &PeerHand,
    data: &[u8],
) -> Result<Option<String>> {
    if !sink.is_open() {
        tracing::warn!("file send skipped: channel is not open");
        return Ok(None);
    }
    let Some(from_id) = from.session_id.as_deref() else {
        tracing::warn!("file send skipped: sender has no session id");
        return Ok(None);
    };

    let file_id = Uuid::new_v4().to_string();
    let total_chunks = data.len().div_ceil(CHUNK_SIZE) as u32;

    tracing::info!(
        file_id = %file_id,
        size = data.len(),
        chunks = total_chunks,
        "starting file send"
    );

    let metadata = WireMessage::FileMetadata {
        from: from_id.to_string(),
        to: to.session_id.clone(),
        file_id: file_id.clone(),
        file_size: data.len() as u64,
        total_chunks,
    };
    sink.send(metadata.to_json()?).await?;

    for (chunk_index, chunk) in data.chunks(CHUNK_SIZE).enumerate() {
        let chunk_b64 = BASE64.encode(chunk);
        let signed = encrypt_and_sign(&chunk_b64, &to.encryption_key, &from.keys.signing)?;

        let frame = WireMessage::FileChunk {
            from: from_id.to_string(),
            to: to.session_id.clone(),
            file_id: file_id.clone(),
            chunk_index: chunk_index as u32,
            payload: transport::encode(&signed),
        };

        drain_backlog(sink).await?;
        sink.send(frame.to_json()?).await?;
    }

    let complete = WireMessage::FileComplete {
        from: from_id.to_string(),
        to: to.session_id.clone(),
        file_id: file_id.clone(),
    };
    sink.send(complete.to_json()?).await?;

    tracing::info!(file_id = %file_id, "file send finished");
    Ok(Some(file_id))
}

// ============================================================================
// TESTS
// ============================================================================
