//! Index lifecycle: clean, populate, rebuild

use crate::models::JobPosting;
use crate::search::document::encode_job;
use crate::search::error::SearchResult;
use crate::search::source::JobSource;
use crate::search::store::IndexStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument};

/// Outcome of a full rebuild
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RebuildReport {
    pub index: String,
    pub documents_indexed: usize,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Drops, recreates and reloads an index from the canonical job source
///
/// Rebuilds are not serialized. Two concurrent calls against the same index
/// race on delete/create and may leave it in either caller's state.
pub struct IndexLifecycleManager {
    store: Arc<dyn IndexStore>,
    source: Arc<dyn JobSource>,
}

impl IndexLifecycleManager {
    pub fn new(store: Arc<dyn IndexStore>, source: Arc<dyn JobSource>) -> Self {
        Self { store, source }
    }

    /// Replace the contents of `index` with the full job source.
    ///
    /// The source is read before the index is touched, so a failing source
    /// leaves the existing index as it was. A failure while populating
    /// leaves a partially filled index behind.
    #[instrument(skip(self))]
    pub async fn rebuild(&self, index: &str) -> SearchResult<RebuildReport> {
        let started_at = Utc::now();
        let timer = Instant::now();

        info!(index = %index, "Starting index rebuild");

        let jobs = self.source.load_all().await?;
        self.clean_index(index).await?;
        info!(index = %index, jobs = jobs.len(), "Index cleaned, loading documents");
        let documents_indexed = self.populate(index, &jobs).await?;
        self.store.refresh_index(index).await?;

        let report = RebuildReport {
            index: index.to_string(),
            documents_indexed,
            started_at,
            duration_ms: u64::try_from(timer.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        info!(
            index = %index,
            documents = documents_indexed,
            duration_ms = report.duration_ms,
            "Index rebuilt"
        );
        Ok(report)
    }

    /// Delete `index` if present, then create it empty
    pub async fn clean_index(&self, index: &str) -> SearchResult<()> {
        if self.store.index_exists(index).await? {
            self.store.delete_index(index).await?;
        }
        self.store.create_index(index).await
    }

    /// Insert every posting under its own id; stops at the first failure
    pub async fn populate(&self, index: &str, jobs: &[JobPosting]) -> SearchResult<usize> {
        let mut indexed = 0;
        for job in jobs {
            let body = encode_job(job)?;
            if let Err(e) = self
                .store
                .insert_document(index, &job.document_id(), &body)
                .await
            {
                error!(
                    index = %index,
                    job_id = job.id,
                    indexed,
                    total = jobs.len(),
                    "Failed to index job: {}",
                    e
                );
                return Err(e);
            }
            indexed += 1;
        }
        Ok(indexed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::error::SearchError;
    use crate::search::memory::InMemoryIndexStore;
    use crate::search::source::StaticJobSource;
    use crate::search::store::{
        AggregateResponse, MultiMatch, RawHit, StoreHealth, TermFilter, TermsAggregation,
    };
    use async_trait::async_trait;

    fn jobs() -> Vec<JobPosting> {
        vec![
            JobPosting::new(1, "Backend Engineer", "Acme", "Austin", "US"),
            JobPosting::new(2, "Backend Engineer II", "Acme", "Paris", "FR"),
            JobPosting::new(3, "Product Designer", "Globex", "Denver", "US"),
        ]
    }

    struct FailingSource;

    #[async_trait]
    impl JobSource for FailingSource {
        async fn load_all(&self) -> SearchResult<Vec<JobPosting>> {
            Err(SearchError::SourceLoadFailure("unreadable".to_string()))
        }
    }

    /// Accepts `limit` inserts, then refuses
    struct FlakyStore {
        inner: InMemoryIndexStore,
        limit: usize,
        inserted: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl IndexStore for FlakyStore {
        async fn index_exists(&self, index: &str) -> SearchResult<bool> {
            self.inner.index_exists(index).await
        }
        async fn delete_index(&self, index: &str) -> SearchResult<()> {
            self.inner.delete_index(index).await
        }
        async fn create_index(&self, index: &str) -> SearchResult<()> {
            self.inner.create_index(index).await
        }
        async fn insert_document(
            &self,
            index: &str,
            id: &str,
            document: &serde_json::Value,
        ) -> SearchResult<()> {
            use std::sync::atomic::Ordering;
            if self.inserted.fetch_add(1, Ordering::SeqCst) >= self.limit {
                return Err(SearchError::StoreUnavailable("connection reset".to_string()));
            }
            self.inner.insert_document(index, id, document).await
        }
        async fn search(&self, index: &str, query: &MultiMatch) -> SearchResult<Vec<RawHit>> {
            self.inner.search(index, query).await
        }
        async fn aggregate(
            &self,
            index: &str,
            filter: &TermFilter,
            aggregation: &TermsAggregation,
            size: usize,
        ) -> SearchResult<AggregateResponse> {
            self.inner.aggregate(index, filter, aggregation, size).await
        }
        async fn health(&self) -> SearchResult<StoreHealth> {
            self.inner.health().await
        }
    }

    #[tokio::test]
    async fn test_rebuild_populates_index() {
        let store = InMemoryIndexStore::new();
        let manager = IndexLifecycleManager::new(
            Arc::new(store.clone()),
            Arc::new(StaticJobSource::new(jobs())),
        );

        let report = manager.rebuild("jobs").await.unwrap();
        assert_eq!(report.index, "jobs");
        assert_eq!(report.documents_indexed, 3);
        assert!(report.duration_ms < 60_000);
        assert!(report.started_at <= Utc::now());
        assert_eq!(store.document_count("jobs"), Some(3));
    }

    #[tokio::test]
    async fn test_rebuild_is_idempotent() {
        let store = InMemoryIndexStore::new();
        let manager = IndexLifecycleManager::new(
            Arc::new(store.clone()),
            Arc::new(StaticJobSource::new(jobs())),
        );

        manager.rebuild("jobs").await.unwrap();
        manager.rebuild("jobs").await.unwrap();
        assert_eq!(store.document_count("jobs"), Some(3));
    }

    #[tokio::test]
    async fn test_rebuild_replaces_stale_documents() {
        let store = InMemoryIndexStore::new();
        store.create_index("jobs").await.unwrap();
        store
            .insert_document("jobs", "99", &serde_json::json!({ "id": 99 }))
            .await
            .unwrap();

        let manager = IndexLifecycleManager::new(
            Arc::new(store.clone()),
            Arc::new(StaticJobSource::new(jobs())),
        );
        manager.rebuild("jobs").await.unwrap();
        assert_eq!(store.document_count("jobs"), Some(3));
    }

    #[tokio::test]
    async fn test_source_failure_leaves_index_untouched() {
        let store = InMemoryIndexStore::new();
        IndexLifecycleManager::new(
            Arc::new(store.clone()),
            Arc::new(StaticJobSource::new(jobs())),
        )
        .rebuild("jobs")
        .await
        .unwrap();

        let failing = IndexLifecycleManager::new(Arc::new(store.clone()), Arc::new(FailingSource));
        let err = failing.rebuild("jobs").await.unwrap_err();

        assert!(matches!(err, SearchError::SourceLoadFailure(_)));
        assert_eq!(store.document_count("jobs"), Some(3));
    }

    #[tokio::test]
    async fn test_partial_load_is_not_rolled_back() {
        let inner = InMemoryIndexStore::new();
        let store = FlakyStore {
            inner: inner.clone(),
            limit: 2,
            inserted: Default::default(),
        };
        let manager =
            IndexLifecycleManager::new(Arc::new(store), Arc::new(StaticJobSource::new(jobs())));

        let err = manager.rebuild("jobs").await.unwrap_err();
        assert!(matches!(err, SearchError::StoreUnavailable(_)));
        assert_eq!(inner.document_count("jobs"), Some(2));
    }

    #[tokio::test]
    async fn test_clean_index_creates_missing_index() {
        let store = InMemoryIndexStore::new();
        let manager = IndexLifecycleManager::new(
            Arc::new(store.clone()),
            Arc::new(StaticJobSource::default()),
        );

        manager.clean_index("fresh").await.unwrap();
        assert!(store.index_exists("fresh").await.unwrap());
        assert_eq!(store.document_count("fresh"), Some(0));
    }

    #[tokio::test]
    async fn test_empty_source_yields_empty_index() {
        let store = InMemoryIndexStore::new();
        let manager = IndexLifecycleManager::new(
            Arc::new(store.clone()),
            Arc::new(StaticJobSource::default()),
        );

        let report = manager.rebuild("jobs").await.unwrap();
        assert_eq!(report.documents_indexed, 0);
        assert_eq!(store.document_count("jobs"), Some(0));
    }
}
