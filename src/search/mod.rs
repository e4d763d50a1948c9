//! Document index and query layer for job postings
//!
//! This module owns everything between the HTTP surface and the external
//! full-text engine:
//!
//! - **Index Lifecycle**: drop, recreate and reload a named index from the
//!   canonical job source
//! - **Fuzzy Search**: multi-field keyword matching with length-based edit
//!   distance
//! - **Department Aggregation**: term filter plus terms aggregation, read back
//!   as a count and the matching postings
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │               SearchService                      │
//! ├─────────────────────────────────────────────────┤
//! │  - rebuild()   - search()                        │
//! │  - aggregate_by_department()   - health()        │
//! └─────────────────────────────────────────────────┘
//!           │                          │
//!           ▼                          ▼
//! ┌──────────────────────┐  ┌──────────────────────┐
//! │ IndexLifecycleManager│  │     QueryEngine      │
//! └──────────────────────┘  └──────────────────────┘
//!           │                          │
//!           ▼                          ▼
//! ┌─────────────────────────────────────────────────┐
//! │        IndexStore (trait)                        │
//! ├─────────────────────────────────────────────────┤
//! │  - ElasticsearchStore (REST)                     │
//! │  - InMemoryIndexStore (tests, local runs)        │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! The store handle is created once at startup and shared by reference.
//! Queries running while a rebuild of the same index is in flight may see a
//! missing or partially loaded index; callers that need stronger guarantees
//! must serialize rebuilds themselves.
//!
//! # Example
//!
//! ```no_run
//! use job_search::search::{
//!     InMemoryIndexStore, JsonFileJobSource, SearchConfig, SearchService,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = SearchService::new(
//!         Arc::new(InMemoryIndexStore::new()),
//!         Arc::new(JsonFileJobSource::new("resources/jobs.json")),
//!         SearchConfig::default(),
//!     );
//!
//!     service.rebuild("jobs_search").await?;
//!     let jobs = service.search("jobs_search", "Enginer").await?;
//!     println!("Found {} jobs", jobs.len());
//!
//!     Ok(())
//! }
//! ```

mod config;
mod document;
mod elasticsearch;
mod error;
mod factory;
mod lifecycle;
mod memory;
mod query;
mod service;
mod source;
mod store;

pub use config::{SearchConfig, SearchConfigBuilder};
pub use document::{
    decode_hit, decode_hits, encode_job, DEPARTMENT_AGGREGATION, DEPARTMENT_KEYWORD_FIELD,
    TITLE_FIELD,
};
pub use elasticsearch::{ElasticsearchConfig, ElasticsearchStore};
pub use error::{SearchError, SearchResult};
pub use factory::{create_in_memory_store, create_index_store};
pub use lifecycle::{IndexLifecycleManager, RebuildReport};
pub use memory::InMemoryIndexStore;
pub use query::{AggregationResult, DepartmentFilterQuery, Fuzziness, SearchQuery};
pub use service::{QueryEngine, SearchService};
pub use source::{JobSource, JsonFileJobSource, StaticJobSource};
pub use store::{
    AggregateResponse, Bucket, IndexStore, MultiMatch, RawHit, StoreHealth, TermFilter,
    TermsAggregation,
};
