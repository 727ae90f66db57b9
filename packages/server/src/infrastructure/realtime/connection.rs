//! Delivery primitive for one live connection.
//!
//! Each connection owns a bounded FIFO queue drained by its WebSocket writer
//! task. `send` never blocks: a full queue or a closed writer drops the frame.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};

/// A serialized frame, shared by every recipient of one broadcast
pub type OutboundFrame = Arc<str>;

/// Why a frame was not delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The connection is unregistered or its writer has stopped
    Gone,
    /// The connection's queue is full
    Saturated,
}

/// Outcome of a single send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Dropped(DropReason),
}

/// Sending half of a connection's outbound queue
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    sender: mpsc::Sender<OutboundFrame>,
}

impl ConnectionHandle {
    /// Create a handle and the receiver the transport drains.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<OutboundFrame>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Enqueue a frame without waiting.
    pub fn send(&self, frame: OutboundFrame) -> Delivery {
        match self.sender.try_send(frame) {
            Ok(()) => Delivery::Delivered,
            Err(TrySendError::Full(_)) => Delivery::Dropped(DropReason::Saturated),
            Err(TrySendError::Closed(_)) => Delivery::Dropped(DropReason::Gone),
        }
    }
}
