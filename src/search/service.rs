//! Query engine and the search service facade

use crate::models::JobPosting;
use crate::search::config::SearchConfig;
use crate::search::document::decode_hits;
use crate::search::error::{SearchError, SearchResult};
use crate::search::lifecycle::{IndexLifecycleManager, RebuildReport};
use crate::search::query::{AggregationResult, DepartmentFilterQuery, SearchQuery};
use crate::search::source::JobSource;
use crate::search::store::{IndexStore, StoreHealth};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Builds and runs read-only queries against an index store
pub struct QueryEngine {
    store: Arc<dyn IndexStore>,
    config: SearchConfig,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn IndexStore>, config: SearchConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Fuzzy keyword search over the configured text fields.
    ///
    /// Postings come back in engine relevance order. A single undecodable
    /// hit fails the whole call.
    #[instrument(skip(self))]
    pub async fn search(&self, index: &str, keyword: &str) -> SearchResult<Vec<JobPosting>> {
        let query = SearchQuery::new(keyword)
            .with_fields(self.config.search_fields.clone())
            .with_fuzziness(self.config.fuzziness)
            .with_limit(self.config.search_limit);
        self.execute_search(index, &query).await
    }

    pub async fn execute_search(
        &self,
        index: &str,
        query: &SearchQuery,
    ) -> SearchResult<Vec<JobPosting>> {
        let hits = self.store.search(index, &query.to_multi_match()).await?;
        let jobs = decode_hits(&hits)?;
        debug!(index = %index, keyword = %query.keyword, hits = jobs.len(), "Search completed");
        Ok(jobs)
    }

    /// Count and list the postings of one department
    #[instrument(skip(self))]
    pub async fn aggregate_by_department(
        &self,
        index: &str,
        iso_code: &str,
    ) -> SearchResult<AggregationResult> {
        let query = DepartmentFilterQuery::new(iso_code)
            .with_aggregation_field(self.config.department_field.clone())
            .with_aggregation_name(self.config.aggregation_name.clone())
            .with_result_limit(self.config.aggregation_result_limit);
        self.execute_aggregation(index, &query).await
    }

    /// The count comes from the bucket keyed by the requested code, never
    /// from bucket position. No such bucket means zero matches; no such
    /// aggregation at all means the engine did not honour the request.
    pub async fn execute_aggregation(
        &self,
        index: &str,
        query: &DepartmentFilterQuery,
    ) -> SearchResult<AggregationResult> {
        let response = self
            .store
            .aggregate(
                index,
                &query.filter(),
                &query.aggregation(),
                query.result_limit,
            )
            .await?;

        let buckets = response
            .aggregations
            .get(&query.aggregation_name)
            .ok_or_else(|| SearchError::AggregationMissing(query.aggregation_name.clone()))?;

        let total_count = buckets
            .iter()
            .find(|bucket| bucket.key == query.iso_code)
            .map(|bucket| bucket.doc_count)
            .unwrap_or(0);

        let matching_documents = decode_hits(&response.hits)?;

        debug!(
            index = %index,
            iso_code = %query.iso_code,
            total_count,
            returned = matching_documents.len(),
            "Department aggregation completed"
        );

        Ok(AggregationResult {
            total_count,
            matching_documents,
        })
    }
}

/// The three operations the service exposes, bound to one shared store handle
pub struct SearchService {
    store: Arc<dyn IndexStore>,
    lifecycle: IndexLifecycleManager,
    engine: QueryEngine,
}

impl SearchService {
    pub fn new(
        store: Arc<dyn IndexStore>,
        source: Arc<dyn JobSource>,
        config: SearchConfig,
    ) -> Self {
        Self {
            lifecycle: IndexLifecycleManager::new(store.clone(), source),
            engine: QueryEngine::new(store.clone(), config),
            store,
        }
    }

    /// Name of the index the service targets by default
    pub fn index_name(&self) -> &str {
        &self.engine.config().index_name
    }

    pub async fn rebuild(&self, index: &str) -> SearchResult<RebuildReport> {
        self.lifecycle.rebuild(index).await
    }

    pub async fn search(&self, index: &str, keyword: &str) -> SearchResult<Vec<JobPosting>> {
        self.engine.search(index, keyword).await
    }

    pub async fn aggregate_by_department(
        &self,
        index: &str,
        iso_code: &str,
    ) -> SearchResult<AggregationResult> {
        self.engine.aggregate_by_department(index, iso_code).await
    }

    pub async fn health(&self) -> SearchResult<StoreHealth> {
        self.store.health().await
    }

    pub fn lifecycle(&self) -> &IndexLifecycleManager {
        &self.lifecycle
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }
}
