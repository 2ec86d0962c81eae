//! WebSocket server binary for random one-to-one chat.

use chat_server::config::Config;
use chat_server::server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        max_clients = config.max_clients,
        path = %config.path,
        history = ?config.history_file,
        "starting chat-server"
    );

    server::run(config).await
}
