//! Delivered-message history.
//!
//! The room hands every delivered message to a [`HistoryWriter`], which
//! forwards it to a dedicated task that appends one CSV record per
//! message to the history file. The room never waits on disk I/O, and
//! write failures are logged and forgotten.

use std::path::{Path, PathBuf};

use chat_core::{DeliveredRecord, HistorySink};
use chat_protocol::csv_codec;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Sending half of the history pipeline.
#[derive(Debug, Clone)]
pub struct HistoryWriter {
    tx: mpsc::UnboundedSender<DeliveredRecord>,
}

impl HistoryWriter {
    /// Start the writer task. With `None`, records are accepted and
    /// discarded.
    pub fn spawn(path: Option<PathBuf>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_history_loop(path, rx));
        (HistoryWriter { tx }, handle)
    }
}

impl HistorySink for HistoryWriter {
    fn record(&self, record: DeliveredRecord) {
        if self.tx.send(record).is_err() {
            warn!("history writer has stopped, record dropped");
        }
    }
}

async fn run_history_loop(path: Option<PathBuf>, mut rx: mpsc::UnboundedReceiver<DeliveredRecord>) {
    match &path {
        Some(path) => info!(path = %path.display(), "appending message history"),
        None => info!("message history disabled"),
    }

    while let Some(record) = rx.recv().await {
        let Some(path) = path.as_deref() else {
            debug!("history disabled, record discarded");
            continue;
        };

        if let Err(e) = append_record(path, &record).await {
            error!(path = %path.display(), error = %e, "failed to append history record");
        }
    }
}

async fn append_record(path: &Path, record: &DeliveredRecord) -> std::io::Result<()> {
    let mut line = csv_codec::format_record(record);
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await?;

    Ok(())
}
