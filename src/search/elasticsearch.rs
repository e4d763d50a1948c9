//! Elasticsearch-backed index store
//!
//! Talks to the engine over its REST API with `reqwest`. Only the handful of
//! endpoints the service needs are covered: index existence/creation/deletion,
//! single-document indexing, refresh, `_search` with either a fuzzy
//! `multi_match` or a `term` filter plus a `terms` aggregation.

use crate::search::error::{SearchError, SearchResult};
use crate::search::query::Fuzziness;
use crate::search::store::{
    AggregateResponse, Bucket, IndexStore, MultiMatch, RawHit, StoreHealth, TermFilter,
    TermsAggregation,
};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

/// Connection settings for the Elasticsearch cluster
#[derive(Debug, Clone)]
pub struct ElasticsearchConfig {
    /// Base URL, e.g. `http://localhost:9200`
    pub url: String,

    /// Per-request timeout
    pub timeout_secs: u64,

    /// Basic auth user
    pub username: Option<String>,

    /// Basic auth password
    pub password: Option<String>,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            timeout_secs: 10,
            username: None,
            password: None,
        }
    }
}

/// Index store speaking the Elasticsearch REST protocol
#[derive(Debug, Clone)]
pub struct ElasticsearchStore {
    client: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl ElasticsearchStore {
    /// Build a client; does not contact the cluster
    pub fn new(config: ElasticsearchConfig) -> SearchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                SearchError::StoreUnavailable(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username,
            password: config.password,
        })
    }

    /// Build a client and verify the cluster answers
    pub async fn connect(config: ElasticsearchConfig) -> SearchResult<Self> {
        let store = Self::new(config)?;
        let health = store.health().await?;
        tracing::info!(
            url = %store.base_url,
            version = health.version.as_deref().unwrap_or("unknown"),
            "Connected to Elasticsearch"
        );
        Ok(store)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}/{}", self.base_url, path));
        match &self.username {
            Some(user) => builder.basic_auth(user, self.password.as_deref()),
            None => builder,
        }
    }

    /// Send and turn non-success statuses into errors
    async fn execute(&self, index: &str, builder: RequestBuilder) -> SearchResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(index, status, &body))
    }

    async fn search_raw(&self, index: &str, body: serde_json::Value) -> SearchResult<EsSearchResponse> {
        tracing::debug!(index = %index, body = %body, "Executing search");
        let response = self
            .execute(
                index,
                self.request(Method::POST, &format!("{}/_search", index)).json(&body),
            )
            .await?;

        response.json::<EsSearchResponse>().await.map_err(|e| {
            SearchError::StoreUnavailable(format!("Malformed search response: {}", e))
        })
    }
}

fn classify_failure(index: &str, status: StatusCode, body: &str) -> SearchError {
    let error_type = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["type"].as_str().map(str::to_string));

    match (status, error_type.as_deref()) {
        (StatusCode::NOT_FOUND, Some("index_not_found_exception")) => {
            SearchError::IndexNotFound(index.to_string())
        }
        _ => SearchError::StoreUnavailable(format!(
            "Elasticsearch returned {} for index {}: {}",
            status, index, body
        )),
    }
}

/// Body of a fuzzy multi-field search
pub fn multi_match_body(query: &MultiMatch) -> serde_json::Value {
    let mut multi_match = json!({
        "query": query.text,
        "fields": query.fields,
    });
    if query.fuzziness == Fuzziness::Auto {
        multi_match["fuzziness"] = json!(query.fuzziness.as_param());
    }

    json!({
        "size": query.size,
        "query": { "multi_match": multi_match }
    })
}

/// Body of a term-filtered search with a terms aggregation
pub fn term_aggregation_body(
    filter: &TermFilter,
    aggregation: &TermsAggregation,
    size: usize,
) -> serde_json::Value {
    let mut term = serde_json::Map::new();
    term.insert(filter.field.clone(), json!(filter.value));

    let mut aggs = serde_json::Map::new();
    aggs.insert(
        aggregation.name.clone(),
        json!({ "terms": { "field": aggregation.field } }),
    );

    json!({
        "size": size,
        "query": { "term": term },
        "aggs": aggs
    })
}

#[async_trait]
impl IndexStore for ElasticsearchStore {
    async fn index_exists(&self, index: &str) -> SearchResult<bool> {
        let response = self.request(Method::HEAD, index).send().await?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(SearchError::StoreUnavailable(format!(
                "Elasticsearch returned {} checking index {}",
                status, index
            ))),
        }
    }

    async fn delete_index(&self, index: &str) -> SearchResult<()> {
        self.execute(index, self.request(Method::DELETE, index))
            .await?;
        tracing::debug!(index = %index, "Index deleted");
        Ok(())
    }

    async fn create_index(&self, index: &str) -> SearchResult<()> {
        self.execute(index, self.request(Method::PUT, index)).await?;
        tracing::debug!(index = %index, "Index created");
        Ok(())
    }

    async fn insert_document(
        &self,
        index: &str,
        id: &str,
        document: &serde_json::Value,
    ) -> SearchResult<()> {
        self.execute(
            index,
            self.request(Method::PUT, &format!("{}/_doc/{}", index, id))
                .json(document),
        )
        .await?;
        Ok(())
    }

    async fn refresh_index(&self, index: &str) -> SearchResult<()> {
        self.execute(
            index,
            self.request(Method::POST, &format!("{}/_refresh", index)),
        )
        .await?;
        Ok(())
    }

    async fn search(&self, index: &str, query: &MultiMatch) -> SearchResult<Vec<RawHit>> {
        let response = self.search_raw(index, multi_match_body(query)).await?;
        Ok(response.hits.into_raw_hits())
    }

    async fn aggregate(
        &self,
        index: &str,
        filter: &TermFilter,
        aggregation: &TermsAggregation,
        size: usize,
    ) -> SearchResult<AggregateResponse> {
        let response = self
            .search_raw(index, term_aggregation_body(filter, aggregation, size))
            .await?;

        let aggregations = response
            .aggregations
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(name, agg)| {
                agg.buckets.map(|buckets| {
                    let buckets = buckets
                        .into_iter()
                        .map(|b| Bucket {
                            key: bucket_key(b.key),
                            doc_count: b.doc_count,
                        })
                        .collect();
                    (name, buckets)
                })
            })
            .collect();

        Ok(AggregateResponse {
            aggregations,
            hits: response.hits.into_raw_hits(),
        })
    }

    async fn health(&self) -> SearchResult<StoreHealth> {
        let response = self.execute("", self.request(Method::GET, "")).await?;
        let info: EsInfoResponse = response.json().await.map_err(|e| {
            SearchError::StoreUnavailable(format!("Malformed info response: {}", e))
        })?;

        Ok(StoreHealth {
            engine: "elasticsearch".to_string(),
            version: info.version.map(|v| v.number),
        })
    }
}

fn bucket_key(key: serde_json::Value) -> String {
    match key {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct EsSearchResponse {
    hits: EsHits,

    #[serde(default)]
    aggregations: Option<HashMap<String, EsAggregation>>,
}

#[derive(Debug, Deserialize)]
struct EsHits {
    hits: Vec<EsHit>,
}

impl EsHits {
    fn into_raw_hits(self) -> Vec<RawHit> {
        self.hits
            .into_iter()
            .map(|hit| RawHit {
                id: hit.id,
                source: hit.source.unwrap_or(serde_json::Value::Null),
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct EsHit {
    #[serde(rename = "_id")]
    id: Option<String>,

    #[serde(rename = "_source")]
    source: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct EsAggregation {
    #[serde(default)]
    buckets: Option<Vec<EsBucket>>,
}

#[derive(Debug, Deserialize)]
struct EsBucket {
    key: serde_json::Value,
    doc_count: u64,
}

#[derive(Debug, Deserialize)]
struct EsInfoResponse {
    version: Option<EsVersion>,
}

#[derive(Debug, Deserialize)]
struct EsVersion {
    number: String,
}
