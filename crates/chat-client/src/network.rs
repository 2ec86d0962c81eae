// crates/chat-client/src/network.rs

use anyhow::Result;
use chat_core::Envelope;
use chat_protocol::json_codec;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::types::{NetCommand, NetEvent};

/// One chat session: connect, pump frames both ways, report the end.
pub struct ChatConnection {
    server_url: String,
    tx: UnboundedSender<NetEvent>,
}

impl ChatConnection {
    pub fn new(server_url: &str, tx: UnboundedSender<NetEvent>) -> Self {
        Self {
            server_url: server_url.to_string(),
            tx,
        }
    }

    /// Run the session to completion. Always ends with exactly one
    /// `NetEvent::Disconnected`.
    pub async fn run(self, rx: UnboundedReceiver<NetCommand>) {
        let outcome = self.session(rx).await;
        let reason = outcome.err().map(|e| e.to_string());
        if let Some(reason) = &reason {
            warn!("session ended with error: {}", reason);
        }
        let _ = self.tx.send(NetEvent::Disconnected(reason));
    }

    async fn session(&self, mut rx: UnboundedReceiver<NetCommand>) -> Result<()> {
        info!("Connecting to {}...", self.server_url);
        let (ws, _) = connect_async(self.server_url.as_str()).await?;
        let (mut ws_tx, mut ws_rx) = ws.split();
        let _ = self.tx.send(NetEvent::Connected);

        loop {
            tokio::select! {
                cmd = rx.recv() => {
                    match cmd {
                        Some(NetCommand::Say(content)) => {
                            let frame = json_codec::encode(&Envelope::client_message(content))?;
                            ws_tx.send(Message::Text(frame.into())).await?;
                        }
                        Some(NetCommand::Leave) | None => {
                            debug!("leaving session");
                            let _ = ws_tx.send(Message::Close(None)).await;
                            return Ok(());
                        }
                    }
                }

                frame = ws_rx.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            let envelope = json_codec::decode(text.as_str());
                            debug!("Received from server: {:?}", envelope);
                            let _ = self.tx.send(NetEvent::Envelope(envelope));
                        }
                        Some(Ok(Message::Close(_))) | None => return Ok(()),
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e.into()),
                    }
                }
            }
        }
    }
}
