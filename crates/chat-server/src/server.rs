//! TCP listener and top-level server wiring.
//!
//! This module:
//! - Listens on the configured address/port.
//! - Accepts new TCP connections, refusing them past `max_clients`.
//! - Performs the WebSocket handshake, accepting only the configured
//!   path and capturing the peer IP as the connection's address tag.
//! - Spawns:
//!   - a per-connection task to handle I/O,
//!   - a single central room task that owns the pairing state,
//!   - the history writer task.
//!
//! The actual per-connection logic and room loop live in the `client`
//! and `room_task` modules respectively.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tracing::{info, warn};

use crate::client;
use crate::config::Config;
use crate::history::HistoryWriter;
use crate::room_task;
use crate::types::{RoomRx, RoomTx};

/// A bound, not yet running, chat server.
pub struct Server {
    listener: TcpListener,
    config: Config,
}

impl Server {
    /// Bind the listening socket.
    pub async fn bind(config: Config) -> anyhow::Result<Self> {
        let addr = config.socket_addr_string();
        let listener = TcpListener::bind(&addr).await?;
        Ok(Server { listener, config })
    }

    /// Actual bound address (useful when the configured port is 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever.
    pub async fn run(self) -> anyhow::Result<()> {
        let Server { listener, config } = self;
        let config = Arc::new(config);

        info!(addr = %listener.local_addr()?, path = %config.path, "listening");

        let (history, _history_handle) = HistoryWriter::spawn(config.history_file.clone());

        // Channel from connection tasks -> room task.
        let (room_tx, room_rx): (RoomTx, RoomRx) = mpsc::unbounded_channel();
        tokio::spawn(room_task::run_room_loop(room_rx, history));

        let active = Arc::new(AtomicUsize::new(0));

        loop {
            let (stream, peer_addr) = listener.accept().await?;

            if active.load(Ordering::Acquire) >= config.max_clients {
                warn!(
                    %peer_addr,
                    max_clients = config.max_clients,
                    "rejecting connection: max_clients reached"
                );
                // Just drop the stream; client will see the connection closed.
                continue;
            }

            let guard = ActiveGuard::new(active.clone());
            let room_tx = room_tx.clone();
            let config = config.clone();

            tokio::spawn(async move {
                let _guard = guard;
                handle_connection(stream, peer_addr, &config, room_tx).await;
            });
        }
    }
}

/// Convenience: bind and run with the given configuration.
pub async fn run(config: Config) -> anyhow::Result<()> {
    Server::bind(config).await?.run().await
}

async fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, config: &Config, room_tx: RoomTx) {
    let expected_path = config.path.clone();
    let check_path = move |request: &Request, response: Response| {
        if request.uri().path() == expected_path {
            Ok(response)
        } else {
            let mut not_found = ErrorResponse::new(Some("not found".to_string()));
            *not_found.status_mut() = StatusCode::NOT_FOUND;
            Err(not_found)
        }
    };

    let ws = match tokio_tungstenite::accept_hdr_async(stream, check_path).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(%peer_addr, error = %e, "websocket handshake failed");
            return;
        }
    };

    // Address tag is the IP only; the port changes on every reconnect.
    let address = peer_addr.ip().to_string();

    if let Err(e) = client::run_client(ws, address, room_tx).await {
        warn!(%peer_addr, error = %e, "client task ended with error");
    }
}

/// Counts a connection as active for as long as it is alive.
struct ActiveGuard(Arc<AtomicUsize>);

impl ActiveGuard {
    fn new(active: Arc<AtomicUsize>) -> Self {
        active.fetch_add(1, Ordering::AcqRel);
        ActiveGuard(active)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
