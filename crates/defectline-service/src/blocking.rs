use std::sync::Arc;

use bytes::Bytes;
use defectline_core::{BlobRef, DefectReport, NewDefectReport};
use defectline_store::BlobClient;
use tokio::runtime::Runtime;

use crate::{
    spawn_submission, HttpReportStore, QueryCache, QueryKey, ServiceError, SubmissionHandle,
};

/// Blocking wrapper around the async client stack.
///
/// Owns a tokio runtime and uses `block_on()` for each call. Designed
/// for sync callers like the TUI; submissions are spawned onto the
/// runtime so uploads progress while the UI keeps drawing.
pub struct BlockingClient {
    store: Arc<HttpReportStore>,
    cache: Arc<QueryCache>,
    blobs: BlobClient,
    rt: Runtime,
}

impl BlockingClient {
    pub fn new(base_url: &str) -> Self {
        let store = Arc::new(HttpReportStore::new(base_url));
        let cache = Arc::new(QueryCache::new(store.clone() as Arc<dyn crate::ReportStore>));
        Self {
            store,
            cache,
            blobs: BlobClient::new(base_url),
            rt: Runtime::new().expect("failed to create tokio runtime"),
        }
    }

    pub fn base_url(&self) -> &str {
        self.store.base_url()
    }

    pub fn health_check(&self) -> Result<(), ServiceError> {
        self.rt.block_on(self.store.health_check())
    }

    /// Cached report listing for a filter key.
    pub fn reports(&self, key: &QueryKey) -> Result<Vec<DefectReport>, ServiceError> {
        self.rt.block_on(self.cache.reports(key))
    }

    pub fn invalidate_reports(&self) {
        self.cache.invalidate_reports();
    }

    /// Start a submission in the background and return its handle.
    pub fn submit(&self, report: NewDefectReport, photo: Option<Bytes>) -> SubmissionHandle {
        let _guard = self.rt.enter();
        spawn_submission(self.cache.clone(), self.blobs.clone(), report, photo)
    }

    pub fn direct_url(&self, blob: &BlobRef) -> String {
        self.blobs.direct_url(blob)
    }

    /// Full photo byte retrieval, for the overlay and future export.
    pub fn fetch_photo(&self, blob: &BlobRef) -> Result<Bytes, ServiceError> {
        self.rt
            .block_on(self.blobs.fetch(blob))
            .map_err(ServiceError::from)
    }
}
