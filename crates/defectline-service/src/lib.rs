mod blocking;
mod cache;
mod http;
mod submit;
mod traits;

pub use blocking::BlockingClient;
pub use cache::{QueryCache, QueryKey};
pub use http::HttpReportStore;
pub use submit::{spawn_submission, SubmissionHandle, SubmitState};
pub use traits::{ReportStore, ServiceError};
