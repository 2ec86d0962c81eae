//! Minimal line-based client for poking at a running server.
//!
//! Every stdin line is sent as a chat message; every frame from the
//! server is printed. Type `quit` or `exit` to leave.

use std::env;
use std::error::Error;

use chat_core::Envelope;
use chat_protocol::json_codec;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Where to connect: env override or default.
    let url = env::var("CHAT_CLIENT_URL").unwrap_or_else(|_| "ws://127.0.0.1:8080/randomchat".to_string());

    println!("Connecting to {}...", url);
    let (ws, _) = connect_async(url.as_str()).await?;
    let (mut ws_tx, mut ws_rx) = ws.split();
    println!("Connected. Type a line to send it, 'quit' or 'exit' to leave.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    println!("\nEOF on stdin, exiting client.");
                    break;
                };

                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
                    println!("Exiting client.");
                    break;
                }

                let frame = json_codec::encode(&Envelope::client_message(trimmed))?;
                ws_tx.send(Message::Text(frame.into())).await?;
            }
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => print_envelope(json_codec::decode(text.as_str())),
                    Some(Ok(Message::Close(_))) | None => {
                        println!("<< connection closed by server");
                        return Ok(());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        eprintln!("Read error: {:?}", e);
                        return Ok(());
                    }
                }
            }
        }
    }

    ws_tx.send(Message::Close(None)).await?;
    Ok(())
}

fn print_envelope(envelope: Envelope) {
    match envelope {
        Envelope::ConnectedToServer => println!("<< connected to server, waiting for a partner"),
        Envelope::ConnectedToUser => println!("<< matched with a stranger"),
        Envelope::DisconnectedFromServer => println!("<< partner left"),
        Envelope::UserCount(n) => println!("<< {} online", n),
        Envelope::ServerMessage(msg) => println!("<< {}", msg.content),
        other => println!("<< (unexpected) {:?}", other),
    }
}
