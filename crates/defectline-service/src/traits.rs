use async_trait::async_trait;
use defectline_core::{DefectReport, NewDefectReport};
use defectline_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(msg) => ServiceError::NotFound(msg),
            StoreError::Internal(msg) => ServiceError::Internal(msg),
        }
    }
}

/// The remote store's report procedures — the sole persistence boundary.
///
/// The query cache and the TUI program against this trait.
/// `HttpReportStore` is the production implementation; tests substitute
/// in-memory doubles.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Create a report. The store assigns the id and timestamp. There is
    /// no idempotency: submitting twice creates two reports.
    async fn create_report(&self, report: &NewDefectReport) -> Result<u64, ServiceError>;

    /// All reports, in whatever order the store returns them.
    async fn list_reports(&self) -> Result<Vec<DefectReport>, ServiceError>;

    /// Reports whose department exactly equals `department`
    /// (case-sensitive). Filtering is delegated to the store.
    async fn reports_by_department(
        &self,
        department: &str,
    ) -> Result<Vec<DefectReport>, ServiceError>;

    /// Reports matching a product name; match semantics are
    /// store-defined. Exposed by the contract but unused by the UI.
    async fn reports_by_product(
        &self,
        product_name: &str,
    ) -> Result<Vec<DefectReport>, ServiceError>;
}
