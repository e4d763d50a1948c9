//! Indexed document layout and hit decoding

use crate::models::JobPosting;
use crate::search::error::{SearchError, SearchResult};
use crate::search::store::RawHit;
use serde::Deserialize;

/// Full-text title field
pub const TITLE_FIELD: &str = "title";

/// Exact (non-analyzed) department code field
pub const DEPARTMENT_KEYWORD_FIELD: &str = "location.department.isoCode.keyword";

/// Name of the department terms aggregation
pub const DEPARTMENT_AGGREGATION: &str = "jobs_by_department";

/// Serialize a posting into the body stored in the index
pub fn encode_job(job: &JobPosting) -> SearchResult<serde_json::Value> {
    serde_json::to_value(job).map_err(|e| {
        SearchError::SourceLoadFailure(format!("job {} is not serializable: {}", job.id, e))
    })
}

/// Decode a single hit
pub fn decode_hit(hit: &RawHit) -> SearchResult<JobPosting> {
    JobPosting::deserialize(&hit.source).map_err(|e| {
        SearchError::DecodeFailure(format!(
            "hit {}: {}",
            hit.id.as_deref().unwrap_or("<no id>"),
            e
        ))
    })
}

/// Decode every hit, failing the whole batch on the first bad one
pub fn decode_hits(hits: &[RawHit]) -> SearchResult<Vec<JobPosting>> {
    hits.iter().map(decode_hit).collect()
}
