//! [`Channel`] implementation backed by a connection's outbound queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chat_core::{Channel, Envelope, SendOutcome};
use chat_protocol::json_codec;
use tracing::error;

use crate::types::{Outbound, OutboundTx};

/// Handle the room uses to reach one WebSocket connection.
///
/// Cheap to clone; all clones share the same open flag and queue.
#[derive(Debug, Clone)]
pub struct WsChannel {
    tx: OutboundTx,
    open: Arc<AtomicBool>,
}

impl WsChannel {
    pub fn new(tx: OutboundTx) -> Self {
        WsChannel {
            tx,
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Called by the connection task as soon as its read side ends, so
    /// the room stops treating it as live before the close event lands.
    pub fn mark_closed(&self) {
        self.open.store(false, Ordering::Release);
    }
}

impl Channel for WsChannel {
    fn send(&self, envelope: &Envelope) -> SendOutcome {
        if !self.is_open() {
            return SendOutcome::Closed;
        }

        let text = match json_codec::encode(envelope) {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "failed to encode outbound envelope");
                return SendOutcome::Closed;
            }
        };

        match self.tx.send(Outbound::Text(text)) {
            Ok(()) => SendOutcome::Sent,
            Err(_) => SendOutcome::Closed,
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire) && !self.tx.is_closed()
    }

    fn close(&self) {
        if self.open.swap(false, Ordering::AcqRel) {
            let _ = self.tx.send(Outbound::Close);
        }
    }
}
