use crate::api::AppState;
use crate::error::Result;
use crate::models::JobPosting;
use crate::search::StoreHealth;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let (status, store, store_error) = match state.search.health().await {
        Ok(health) => ("healthy", Some(health), None),
        Err(e) => {
            tracing::warn!(error = %e, "Index store health probe failed");
            ("degraded", None, Some(e.to_string()))
        }
    };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        index: state.search.index_name().to_string(),
        store,
        store_error,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub index: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreHealth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_error: Option<String>,
}

/// Rebuild the job index from the canonical source
pub async fn index_jobs(State(state): State<AppState>) -> Result<Json<IndexJobsResponse>> {
    let report = state.search.rebuild(state.search.index_name()).await?;

    Ok(Json(IndexJobsResponse {
        status: "success".to_string(),
        index: report.index,
        documents_indexed: report.documents_indexed,
        duration_ms: report.duration_ms,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexJobsResponse {
    pub status: String,
    pub index: String,
    pub documents_indexed: usize,
    pub duration_ms: u64,
}

/// Fuzzy keyword search over job titles
pub async fn search_jobs(
    State(state): State<AppState>,
    Query(params): Query<SearchJobsParams>,
) -> Result<Json<JobsResponse>> {
    let params = params.trimmed();
    params.validate()?;

    let jobs = state
        .search
        .search(state.search.index_name(), &params.keyword)
        .await?;

    Ok(Json(JobsResponse {
        total: jobs.len() as u64,
        jobs,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchJobsParams {
    #[serde(default)]
    #[validate(length(min = 1, message = "keyword is required"))]
    pub keyword: String,
}

impl SearchJobsParams {
    /// Surrounding whitespace is dropped before validation, so blank input is rejected
    pub fn trimmed(self) -> Self {
        Self {
            keyword: self.keyword.trim().to_string(),
        }
    }
}

/// Count and list the postings of one department
pub async fn jobs_by_department(
    State(state): State<AppState>,
    Query(params): Query<DepartmentParams>,
) -> Result<Json<JobsResponse>> {
    let params = params.trimmed();
    params.validate()?;

    let result = state
        .search
        .aggregate_by_department(state.search.index_name(), &params.isocode)
        .await?;

    Ok(Json(JobsResponse {
        total: result.total_count,
        jobs: result.matching_documents,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct DepartmentParams {
    #[serde(default)]
    #[validate(length(min = 1, message = "isocode is required"))]
    pub isocode: String,
}

impl DepartmentParams {
    pub fn trimmed(self) -> Self {
        Self {
            isocode: self.isocode.trim().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobsResponse {
    pub total: u64,
    pub jobs: Vec<JobPosting>,
}
