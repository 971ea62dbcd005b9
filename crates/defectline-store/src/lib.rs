mod client;
mod upload;

pub use client::{BlobClient, CHUNK_SIZE};
pub use upload::Upload;

/// Errors from the remote blob storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Internal(String),
}
