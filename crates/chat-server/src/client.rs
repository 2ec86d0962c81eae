// crates/chat-server/src/client.rs

//! Per-connection I/O.
//!
//! Each accepted WebSocket gets one task running [`run_client`]:
//! - admit through the room task and learn its `ConnectionId`,
//! - spawn a writer task draining the connection's outbound queue,
//! - decode inbound frames and forward them to the room,
//! - report the close exactly once when the stream ends.

use chat_core::Envelope;
use chat_protocol::json_codec;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, info, warn};

use crate::types::{ConnectionId, Outbound, OutboundRx, RoomRequest, RoomTx};
use crate::ws_channel::WsChannel;

/// Run the client I/O loop for a single upgraded connection.
pub async fn run_client<S>(
    ws: WebSocketStream<S>,
    address: String,
    room_tx: RoomTx,
) -> anyhow::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (ws_tx, mut ws_rx) = ws.split();

    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let channel = WsChannel::new(out_tx);

    // Admission: the room greets the connection through its queue, so
    // the greeting is waiting for the writer as soon as it starts.
    let (reply_tx, reply_rx) = oneshot::channel();
    room_tx
        .send(RoomRequest::Admit {
            channel: channel.clone(),
            address: address.clone(),
            reply: reply_tx,
        })
        .map_err(|_| anyhow::anyhow!("room task is gone"))?;
    let id = reply_rx.await?;

    info!(%id, address, "client connected");

    let mut writer = tokio::spawn(run_writer(id, ws_tx, out_rx));

    loop {
        tokio::select! {
            frame = ws_rx.next() => {
                let envelope = match frame {
                    Some(Ok(Message::Text(text))) => json_codec::decode(text.as_str()),
                    Some(Ok(Message::Binary(bytes))) => json_codec::decode_bytes(&bytes),
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%id, "stream ended");
                        break;
                    }
                    Some(Ok(_)) => continue, // ping / pong, answered by tungstenite
                    Some(Err(e)) => {
                        warn!(%id, error = %e, "read error");
                        break;
                    }
                };

                if let Envelope::Invalid(reason) = &envelope {
                    debug!(%id, %reason, "undecodable frame");
                }

                if room_tx.send(RoomRequest::Message { id, envelope }).is_err() {
                    warn!(%id, "room task is gone");
                    break;
                }
            }
            _ = &mut writer => {
                // Closed from our side (partner left) or the socket
                // stopped accepting writes.
                debug!(%id, "writer finished");
                break;
            }
        }
    }

    channel.mark_closed();
    let _ = room_tx.send(RoomRequest::Close { id });
    writer.abort();

    info!(%id, "client disconnected");
    Ok(())
}

async fn run_writer<W>(id: ConnectionId, mut ws_tx: W, mut out_rx: OutboundRx)
where
    W: futures::Sink<Message> + Unpin,
    W::Error: std::fmt::Display,
{
    while let Some(frame) = out_rx.recv().await {
        match frame {
            Outbound::Text(text) => {
                if let Err(e) = ws_tx.send(Message::Text(text.into())).await {
                    debug!(%id, error = %e, "write error");
                    break;
                }
            }
            Outbound::Close => {
                let _ = ws_tx.send(Message::Close(None)).await;
                debug!(%id, "closed by server");
                break;
            }
        }
    }
}
