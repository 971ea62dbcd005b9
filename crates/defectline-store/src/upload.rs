use bytes::Bytes;
use defectline_core::BlobRef;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::client::{BlobClient, CHUNK_SIZE};
use crate::StoreError;

/// An in-flight photo upload.
///
/// Progress is published as whole percentages (0–100, non-decreasing) on
/// a watch channel after every stored chunk. [`Upload::finish`] resolves
/// to the blob reference once the store holds all bytes; creation calls
/// that reference the blob must await it first. There is no cancellation
/// protocol: dropping the handle merely abandons an incomplete blob.
pub struct Upload {
    progress: watch::Receiver<u8>,
    handle: JoinHandle<Result<BlobRef, StoreError>>,
}

impl Upload {
    pub(crate) fn spawn(client: BlobClient, data: Bytes) -> Self {
        let (tx, rx) = watch::channel(0u8);
        let handle = tokio::spawn(async move { run_upload(client, data, tx).await });
        Self {
            progress: rx,
            handle,
        }
    }

    /// Observable upload percentage.
    pub fn progress(&self) -> watch::Receiver<u8> {
        self.progress.clone()
    }

    /// Wait for the upload to complete and return the stored reference.
    pub async fn finish(self) -> Result<BlobRef, StoreError> {
        self.handle
            .await
            .map_err(|e| StoreError::Internal(format!("upload task: {e}")))?
    }
}

async fn run_upload(
    client: BlobClient,
    data: Bytes,
    progress: watch::Sender<u8>,
) -> Result<BlobRef, StoreError> {
    let total = data.len();
    let key = client.create_blob(total).await?;

    let mut sent = 0;
    while sent < total {
        let end = (sent + CHUNK_SIZE).min(total);
        client.put_chunk(&key, sent, data.slice(sent..end)).await?;
        sent = end;
        let percent = ((sent as f64 / total as f64) * 100.0).floor() as u8;
        let _ = progress.send(percent);
    }
    if total == 0 {
        let _ = progress.send(100);
    }

    tracing::debug!(key = %key, bytes = total, "photo upload complete");
    Ok(BlobRef::from_key(key))
}
