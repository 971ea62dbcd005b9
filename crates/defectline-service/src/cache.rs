use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use defectline_core::{DefectReport, NewDefectReport};

use crate::{ReportStore, ServiceError};

/// Cache key for report listings: one entry per filter value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    AllReports,
    ByDepartment(String),
}

struct QuerySlot {
    // The async mutex doubles as in-flight deduplication: concurrent
    // fetches for the same key queue here, and all but the first are
    // served from the value the first one cached.
    state: tokio::sync::Mutex<Option<Vec<DefectReport>>>,
}

/// The data-fetching layer between the UI and the remote store.
///
/// Listings are cached per filter key. The consistency discipline is
/// invalidate-on-write: a successful creation drops every cached listing
/// so the next access refetches. Fetch errors are never cached, and no
/// timeout is imposed on store calls.
pub struct QueryCache {
    store: Arc<dyn ReportStore>,
    slots: Mutex<HashMap<QueryKey, Arc<QuerySlot>>>,
}

impl QueryCache {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self {
            store,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: &QueryKey) -> Arc<QuerySlot> {
        let mut slots = self.slots.lock().unwrap();
        slots
            .entry(key.clone())
            .or_insert_with(|| {
                Arc::new(QuerySlot {
                    state: tokio::sync::Mutex::new(None),
                })
            })
            .clone()
    }

    /// Fetch the listing for `key`, serving a cached result when one
    /// exists.
    pub async fn reports(&self, key: &QueryKey) -> Result<Vec<DefectReport>, ServiceError> {
        let slot = self.slot(key);
        let mut state = slot.state.lock().await;
        if let Some(ref cached) = *state {
            return Ok(cached.clone());
        }
        let fetched = match key {
            QueryKey::AllReports => self.store.list_reports().await?,
            QueryKey::ByDepartment(dept) => self.store.reports_by_department(dept).await?,
        };
        *state = Some(fetched.clone());
        Ok(fetched)
    }

    /// Create a report and invalidate every cached listing before
    /// returning, so subsequent list views reflect the new report.
    pub async fn create_report(&self, report: &NewDefectReport) -> Result<u64, ServiceError> {
        let id = self.store.create_report(report).await?;
        self.invalidate_reports();
        Ok(id)
    }

    /// Drop all cached listings. A fetch already in flight writes into
    /// an orphaned slot and its result is discarded on the next access.
    pub fn invalidate_reports(&self) {
        self.slots.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct CountingStore {
        reports: Mutex<Vec<DefectReport>>,
        list_calls: AtomicUsize,
        dept_calls: AtomicUsize,
        fail_next_list: AtomicBool,
    }

    impl CountingStore {
        fn push(&self, id: u64, department: &str) {
            self.reports.lock().unwrap().push(DefectReport {
                id,
                product_name: format!("P{id}"),
                department: department.into(),
                employee_id: "E1".into(),
                description: "d".into(),
                timestamp_ns: id as i64,
                photo: None,
            });
        }
    }

    #[async_trait]
    impl ReportStore for CountingStore {
        async fn create_report(&self, report: &NewDefectReport) -> Result<u64, ServiceError> {
            let id = self.reports.lock().unwrap().len() as u64 + 1;
            self.push(id, &report.department);
            Ok(id)
        }

        async fn list_reports(&self) -> Result<Vec<DefectReport>, ServiceError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_next_list.swap(false, Ordering::SeqCst) {
                return Err(ServiceError::Internal("store down".into()));
            }
            Ok(self.reports.lock().unwrap().clone())
        }

        async fn reports_by_department(
            &self,
            department: &str,
        ) -> Result<Vec<DefectReport>, ServiceError> {
            self.dept_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .reports
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.department == department)
                .cloned()
                .collect())
        }

        async fn reports_by_product(
            &self,
            _product_name: &str,
        ) -> Result<Vec<DefectReport>, ServiceError> {
            Ok(vec![])
        }
    }

    fn new_report(department: &str) -> NewDefectReport {
        NewDefectReport {
            product_name: "Widget-7".into(),
            department: department.into(),
            employee_id: "E123".into(),
            description: "Crack on edge".into(),
            photo: None,
        }
    }

    #[tokio::test]
    async fn repeated_fetches_hit_cache() {
        let store = Arc::new(CountingStore::default());
        store.push(1, "cutting");
        let cache = QueryCache::new(store.clone());

        let first = cache.reports(&QueryKey::AllReports).await.unwrap();
        let second = cache.reports(&QueryKey::AllReports).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn keys_are_cached_independently() {
        let store = Arc::new(CountingStore::default());
        store.push(1, "cutting");
        store.push(2, "painting");
        let cache = QueryCache::new(store.clone());

        let all = cache.reports(&QueryKey::AllReports).await.unwrap();
        let cutting = cache
            .reports(&QueryKey::ByDepartment("cutting".into()))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(cutting.len(), 1);
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.dept_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn create_invalidates_all_listings() {
        let store = Arc::new(CountingStore::default());
        let cache = QueryCache::new(store.clone());

        assert!(cache.reports(&QueryKey::AllReports).await.unwrap().is_empty());
        cache
            .reports(&QueryKey::ByDepartment("cutting".into()))
            .await
            .unwrap();

        cache.create_report(&new_report("cutting")).await.unwrap();
        cache.create_report(&new_report("painting")).await.unwrap();

        // Both new reports visible on the next "all" fetch.
        let all = cache.reports(&QueryKey::AllReports).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 2);

        let cutting = cache
            .reports(&QueryKey::ByDepartment("cutting".into()))
            .await
            .unwrap();
        assert_eq!(cutting.len(), 1);
        assert_eq!(store.dept_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let store = Arc::new(CountingStore::default());
        store.push(1, "cutting");
        store.fail_next_list.store(true, Ordering::SeqCst);
        let cache = QueryCache::new(store.clone());

        assert!(cache.reports(&QueryKey::AllReports).await.is_err());
        // The retry goes back to the store and succeeds.
        let reports = cache.reports(&QueryKey::AllReports).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_identical_fetches_share_one_store_call() {
        let store = Arc::new(CountingStore::default());
        store.push(1, "cutting");
        let cache = Arc::new(QueryCache::new(store.clone()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache.reports(&QueryKey::AllReports).await.unwrap()
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().len(), 1);
        }
        assert_eq!(store.list_calls.load(Ordering::SeqCst), 1);
    }
}
