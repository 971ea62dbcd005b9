use std::sync::Arc;

use bytes::Bytes;
use defectline_core::NewDefectReport;
use defectline_store::BlobClient;
use tokio::sync::watch;

use crate::{QueryCache, ServiceError};

/// State of a single in-progress submission.
///
/// `Idle → Validating → (Uploading →) Submitting → Succeeded | Failed`.
/// The UI disables the submit action while any required field is empty,
/// so the machine never leaves `Idle` with missing fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Validating,
    Uploading { percent: u8 },
    Submitting,
    Succeeded { id: u64 },
    Failed,
}

impl SubmitState {
    /// Terminal states: the workflow is over, success or not.
    pub fn is_settled(&self) -> bool {
        matches!(self, SubmitState::Succeeded { .. } | SubmitState::Failed)
    }
}

/// Handle to a submission running on the client runtime. The UI polls
/// [`SubmissionHandle::state`] from its event loop; nothing blocks.
pub struct SubmissionHandle {
    state: watch::Receiver<SubmitState>,
}

impl SubmissionHandle {
    pub fn state(&self) -> SubmitState {
        self.state.borrow().clone()
    }
}

/// Drive one submission: optional photo upload with progress, then the
/// creation call, then cache invalidation. One attempt only; on any
/// failure the workflow settles in `Failed` and the error goes to the
/// diagnostic log, not to the user. Must be called within a tokio
/// runtime.
pub fn spawn_submission(
    cache: Arc<QueryCache>,
    blobs: BlobClient,
    report: NewDefectReport,
    photo: Option<Bytes>,
) -> SubmissionHandle {
    let (tx, rx) = watch::channel(SubmitState::Validating);
    tokio::spawn(async move {
        match run_submission(&cache, &blobs, report, photo, &tx).await {
            Ok(id) => {
                let _ = tx.send(SubmitState::Succeeded { id });
            }
            Err(e) => {
                tracing::error!(error = %e, "defect report submission failed");
                let _ = tx.send(SubmitState::Failed);
            }
        }
    });
    SubmissionHandle { state: rx }
}

async fn run_submission(
    cache: &QueryCache,
    blobs: &BlobClient,
    mut report: NewDefectReport,
    photo: Option<Bytes>,
    tx: &watch::Sender<SubmitState>,
) -> Result<u64, ServiceError> {
    report
        .validate()
        .map_err(|e| ServiceError::InvalidInput(e.to_string()))?;

    if let Some(bytes) = photo {
        let _ = tx.send(SubmitState::Uploading { percent: 0 });
        let upload = blobs.upload(bytes);
        let mut progress = upload.progress();
        let finish = upload.finish();
        tokio::pin!(finish);

        let mut progress_open = true;
        let blob = loop {
            tokio::select! {
                result = &mut finish => break result?,
                changed = progress.changed(), if progress_open => {
                    match changed {
                        Ok(()) => {
                            let percent = *progress.borrow();
                            let _ = tx.send(SubmitState::Uploading { percent });
                        }
                        Err(_) => progress_open = false,
                    }
                }
            }
        };
        report.photo = Some(blob);
    }

    let _ = tx.send(SubmitState::Submitting);
    cache.create_report(&report).await
}
