use bytes::Bytes;
use defectline_core::BlobRef;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::upload::Upload;
use crate::StoreError;

/// Upload chunk size. Small enough that even modest photos produce
/// several progress updates.
pub const CHUNK_SIZE: usize = 256 * 1024;

#[derive(Debug, Deserialize)]
struct CreatedBlob {
    key: String,
}

/// HTTP client for the remote store's blob endpoints.
///
/// Uploads are chunked so progress can be reported between chunks;
/// retrieval and URL resolution work for both stored and external blobs.
#[derive(Clone)]
pub struct BlobClient {
    base_url: String,
    client: Client,
}

impl BlobClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Synchronous URL resolution, valid as an image source.
    pub fn direct_url(&self, blob: &BlobRef) -> String {
        blob.direct_url(&self.base_url)
    }

    /// Begin an asynchronous upload. Returns immediately; the returned
    /// handle exposes a progress stream and resolves to a [`BlobRef`]
    /// once every chunk is stored. Must be called within a tokio runtime.
    pub fn upload(&self, data: Bytes) -> Upload {
        Upload::spawn(self.clone(), data)
    }

    /// Full byte retrieval. Unused by the table rendering path; the
    /// photo overlay and export paths use it.
    pub async fn fetch(&self, blob: &BlobRef) -> Result<Bytes, StoreError> {
        let url = self.direct_url(blob);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::Internal(format!("fetch {url}: {e}")))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(url));
        }
        if !resp.status().is_success() {
            return Err(StoreError::Internal(format!(
                "fetch {url}: {}",
                resp.status()
            )));
        }
        resp.bytes()
            .await
            .map_err(|e| StoreError::Internal(format!("read body: {e}")))
    }

    pub(crate) async fn create_blob(&self, size: usize) -> Result<String, StoreError> {
        let resp = self
            .client
            .post(format!("{}/api/blobs", self.base_url))
            .json(&serde_json::json!({ "size": size }))
            .send()
            .await
            .map_err(|e| StoreError::Internal(format!("create blob: {e}")))?;
        if !resp.status().is_success() {
            return Err(StoreError::Internal(format!(
                "create blob: {}",
                resp.status()
            )));
        }
        let created = resp
            .json::<CreatedBlob>()
            .await
            .map_err(|e| StoreError::Internal(format!("json decode: {e}")))?;
        Ok(created.key)
    }

    pub(crate) async fn put_chunk(
        &self,
        key: &str,
        offset: usize,
        chunk: Bytes,
    ) -> Result<(), StoreError> {
        let resp = self
            .client
            .put(format!("{}/api/blobs/{key}/data", self.base_url))
            .query(&[("offset", offset.to_string())])
            .body(chunk)
            .send()
            .await
            .map_err(|e| StoreError::Internal(format!("put chunk: {e}")))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(key.to_string()));
        }
        if !resp.status().is_success() {
            return Err(StoreError::Internal(format!(
                "put chunk at {offset}: {}",
                resp.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = BlobClient::new("http://127.0.0.1:3620/");
        assert_eq!(client.base_url(), "http://127.0.0.1:3620");
        assert_eq!(
            client.direct_url(&BlobRef::from_key("k1")),
            "http://127.0.0.1:3620/api/blobs/k1"
        );
    }

    #[test]
    fn external_blob_url_passes_through() {
        let client = BlobClient::new("http://127.0.0.1:3620");
        let blob = BlobRef::from_url("https://img.example/p.png");
        assert_eq!(client.direct_url(&blob), "https://img.example/p.png");
    }
}
