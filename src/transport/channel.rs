//! # Channel Boundary
//!
//! The core never owns a socket. It talks to an injected [`FrameSink`]: the
//! surrounding connection layer (a WebSocket in practice) implements it and
//! reports its outbound backlog, and the send paths here throttle themselves
//! against that backlog so a slow peer cannot force unbounded buffering.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::{Error, Result};

/// How often the backlog-drain wait re-checks the sink
pub const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// An outbound message-oriented channel carrying UTF-8 text frames.
///
/// Frames are assumed delivered in send order but not assumed delivered at
/// all; reliability is the transport's problem, not the core's.
#[async_trait]
pub trait FrameSink: Send + Sync {
    /// Queue one text frame for transmission
    async fn send(&self, frame: String) -> Result<()>;

    /// Bytes queued by the channel implementation awaiting actual
    /// transmission (the WebSocket `bufferedAmount`)
    fn backlog(&self) -> usize;

    /// A watch receiver that reads `true` once the underlying channel has
    /// closed. Waiters select on this so they stop the moment the channel
    /// dies instead of sleeping past it.
    fn closed(&self) -> watch::Receiver<bool>;

    /// Whether the channel is currently open
    fn is_open(&self) -> bool {
        !*self.closed().borrow()
    }
}

/// Cooperatively wait until the sink's backlog drains to zero.
///
/// Polls at [`DRAIN_POLL_INTERVAL`], yielding between checks; returns
/// `ChannelClosed` as soon as the closure signal fires, so no waiter can
/// outlive the channel.
pub async fn drain_backlog<S: FrameSink + ?Sized>(sink: &S) -> Result<()> {
    let mut closed = sink.closed();
    if *closed.borrow() {
        return Err(Error::ChannelClosed);
    }

    while sink.backlog() > 0 {
        tokio::select! {
            changed = closed.changed() => {
                if changed.is_err() || *closed.borrow() {
                    return Err(Error::ChannelClosed);
                }
            }
            _ = tokio::time::sleep(DRAIN_POLL_INTERVAL) => {}
        }
    }

    Ok(())
}

// ============================================================================
// TEST SUPPORT
// ============================================================================


// ============================================================================
// TESTS
// ============================================================================
