//! File-backed chat history: one append-only log file per room.

use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{error, warn};

use super::PersistenceSink;
use crate::entities::OutboundEnvelope;

/// Writes every recorded envelope to `<directory>/<room>.log`.
///
/// `record` is a non-blocking channel send; a dedicated writer task does the
/// I/O. Write failures are logged and the envelope is dropped, never
/// surfaced to the dispatcher.
pub struct FileHistorySink {
    tx: mpsc::UnboundedSender<OutboundEnvelope>,
}

impl FileHistorySink {
    /// Spawn the writer task. Must be called from within a tokio runtime.
    pub fn spawn(directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        let (tx, mut rx) = mpsc::unbounded_channel::<OutboundEnvelope>();

        tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                if let Err(err) = append(&directory, &envelope).await {
                    error!(
                        error = %err,
                        room_id = %envelope.room_id,
                        "failed to append chat history"
                    );
                }
            }
        });

        Self { tx }
    }
}

impl PersistenceSink for FileHistorySink {
    fn record(&self, envelope: &OutboundEnvelope) {
        if self.tx.send(envelope.clone()).is_err() {
            warn!("history writer task is gone; dropping envelope");
        }
    }
}

async fn append(directory: &Path, envelope: &OutboundEnvelope) -> std::io::Result<()> {
    fs::create_dir_all(directory).await?;

    let path = directory.join(format!("{}.log", sanitize(&envelope.room_id)));
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .await?;

    let line = format!(
        "[{}] {} {}:{}\n",
        envelope.sent_at,
        envelope.kind.as_str(),
        envelope.sender,
        envelope.body
    );
    file.write_all(line.as_bytes()).await?;
    Ok(())
}

/// Room ids are client-supplied; keep them out of path syntax.
fn sanitize(room_id: &str) -> String {
    room_id
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
