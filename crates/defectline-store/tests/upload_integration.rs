//! Chunked blob upload tests against an in-process sim store.

use bytes::Bytes;
use defectline_core::BlobRef;
use defectline_simstore::spawn_sim_store;
use defectline_store::{BlobClient, StoreError, CHUNK_SIZE};

#[tokio::test]
async fn upload_then_fetch_roundtrip() {
    let store = spawn_sim_store().await;
    let client = BlobClient::new(&store.base_url);

    // Not a multiple of the chunk size, so the last chunk is short.
    let data = Bytes::from(vec![0xC3; 2 * CHUNK_SIZE + 517]);
    let blob = client.upload(data.clone()).finish().await.unwrap();
    assert!(matches!(blob, BlobRef::Stored { .. }));
    assert_eq!(client.fetch(&blob).await.unwrap(), data);
}

#[tokio::test]
async fn progress_is_monotonic_and_reaches_completion() {
    let store = spawn_sim_store().await;
    let client = BlobClient::new(&store.base_url);

    let upload = client.upload(Bytes::from(vec![0; 5 * CHUNK_SIZE]));
    let mut progress = upload.progress();
    let collector = tokio::spawn(async move {
        let mut seen = vec![*progress.borrow_and_update()];
        while progress.changed().await.is_ok() {
            seen.push(*progress.borrow_and_update());
        }
        seen
    });

    upload.finish().await.unwrap();
    let seen = collector.await.unwrap();
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "regressed: {seen:?}");
    assert_eq!(seen.last(), Some(&100));
}

#[tokio::test]
async fn empty_upload_completes_at_once() {
    let store = spawn_sim_store().await;
    let client = BlobClient::new(&store.base_url);

    let upload = client.upload(Bytes::new());
    let mut progress = upload.progress();
    let blob = upload.finish().await.unwrap();
    assert_eq!(*progress.borrow_and_update(), 100);
    assert!(client.fetch(&blob).await.unwrap().is_empty());
}

#[tokio::test]
async fn fetch_unknown_key_is_not_found() {
    let store = spawn_sim_store().await;
    let client = BlobClient::new(&store.base_url);

    let missing = BlobRef::from_key("no-such-blob");
    assert!(matches!(
        client.fetch(&missing).await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn direct_url_points_at_blob_endpoint() {
    let store = spawn_sim_store().await;
    let client = BlobClient::new(&store.base_url);

    let blob = client
        .upload(Bytes::from_static(b"jpeg bytes"))
        .finish()
        .await
        .unwrap();
    let url = client.direct_url(&blob);
    assert!(url.starts_with(&store.base_url));
    assert!(url.contains("/api/blobs/"));

    // The URL is directly fetchable.
    let body = reqwest::get(&url).await.unwrap().bytes().await.unwrap();
    assert_eq!(&body[..], b"jpeg bytes");
}
