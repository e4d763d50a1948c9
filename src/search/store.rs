//! Index store capability
//!
//! The search core talks to the full-text engine only through [`IndexStore`].
//! Requests and responses are expressed in engine-neutral types; each
//! implementation translates them to its own wire protocol.

use crate::search::error::SearchResult;
use crate::search::query::Fuzziness;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A raw match returned by the store, before decoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHit {
    /// Document identifier inside the index
    pub id: Option<String>,

    /// The stored document body
    pub source: serde_json::Value,
}

/// Fuzzy multi-field text match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiMatch {
    /// Text to match
    pub text: String,

    /// Field paths to match against, in order
    pub fields: Vec<String>,

    /// Allowed edit distance policy
    pub fuzziness: Fuzziness,

    /// Maximum number of hits to return
    pub size: usize,
}

/// Exact-value filter on a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermFilter {
    pub field: String,
    pub value: String,
}

/// Terms aggregation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsAggregation {
    /// Name under which the engine reports the aggregation
    pub name: String,

    /// Field path to bucket by
    pub field: String,
}

/// One aggregation bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub key: String,
    pub doc_count: u64,
}

/// Combined filter + aggregation response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResponse {
    /// Bucket lists keyed by aggregation name; a requested aggregation may be absent
    pub aggregations: HashMap<String, Vec<Bucket>>,

    /// Matching documents, bounded by the requested size
    pub hits: Vec<RawHit>,
}

/// Engine identity reported by a health probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreHealth {
    pub engine: String,
    pub version: Option<String>,
}

/// Capability set of the external search/index engine
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Check whether an index exists
    async fn index_exists(&self, index: &str) -> SearchResult<bool>;

    /// Delete an index with all its documents and mappings
    async fn delete_index(&self, index: &str) -> SearchResult<()>;

    /// Create a fresh, empty index
    async fn create_index(&self, index: &str) -> SearchResult<()>;

    /// Insert (or overwrite) a single document
    async fn insert_document(
        &self,
        index: &str,
        id: &str,
        document: &serde_json::Value,
    ) -> SearchResult<()>;

    /// Make previously inserted documents visible to queries
    async fn refresh_index(&self, _index: &str) -> SearchResult<()> {
        Ok(())
    }

    /// Run a fuzzy multi-field match; hits come back in engine relevance order
    async fn search(&self, index: &str, query: &MultiMatch) -> SearchResult<Vec<RawHit>>;

    /// Run a filtered query with a terms aggregation attached
    async fn aggregate(
        &self,
        index: &str,
        filter: &TermFilter,
        aggregation: &TermsAggregation,
        size: usize,
    ) -> SearchResult<AggregateResponse>;

    /// Probe the engine
    async fn health(&self) -> SearchResult<StoreHealth>;
}
