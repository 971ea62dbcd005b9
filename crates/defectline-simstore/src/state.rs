use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use defectline_core::DefectReport;

/// One uploaded blob. Chunks arrive append-only; the blob is complete
/// once `data` reaches `expected_size`.
pub struct BlobSlot {
    pub expected_size: usize,
    pub data: Vec<u8>,
}

#[derive(Default)]
pub struct InnerSimState {
    pub reports: Mutex<Vec<DefectReport>>,
    next_id: AtomicU64,
    pub blobs: Mutex<HashMap<String, BlobSlot>>,
}

impl InnerSimState {
    /// Store-assigned report id: monotonically increasing, starting at 1.
    pub fn next_report_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

pub type SimState = Arc<InnerSimState>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_ids_are_monotonic_from_one() {
        let state = InnerSimState::default();
        assert_eq!(state.next_report_id(), 1);
        assert_eq!(state.next_report_id(), 2);
        assert_eq!(state.next_report_id(), 3);
    }
}
