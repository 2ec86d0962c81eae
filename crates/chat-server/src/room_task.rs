//! Central room loop.
//!
//! This task owns the `ChatRoom` and processes every `RoomRequest`
//! coming from connection tasks, one at a time. No other task touches
//! the waiting pool or the pairing map.

use chat_core::ChatRoom;
use tracing::{debug, info};

use crate::history::HistoryWriter;
use crate::types::{RoomRequest, RoomRx};

/// Run the central room processing loop until every sender is gone.
pub async fn run_room_loop(mut room_rx: RoomRx, history: HistoryWriter) {
    let mut room = ChatRoom::new(history);

    while let Some(req) = room_rx.recv().await {
        match req {
            RoomRequest::Admit {
                channel,
                address,
                reply,
            } => {
                let id = room.admit(channel, address);
                if reply.send(id).is_err() {
                    // The connection task gave up before hearing back.
                    debug!(%id, "admission reply dropped, closing");
                    room.handle_close(id);
                }
            }
            RoomRequest::Message { id, envelope } => {
                let outcome = room.route(id, envelope);
                debug!(%id, ?outcome, "routed");
            }
            RoomRequest::Close { id } => {
                room.handle_close(id);
            }
        }
    }

    info!("Room loop shutting down (room_rx closed)");
}
