//! Canonical document source for index rebuilds

use crate::models::JobPosting;
use crate::search::error::{SearchError, SearchResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Read-only provider of the full job posting collection
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Load every posting, in source order
    async fn load_all(&self) -> SearchResult<Vec<JobPosting>>;
}

/// Postings read from a JSON array file
#[derive(Debug, Clone)]
pub struct JsonFileJobSource {
    path: PathBuf,
}

impl JsonFileJobSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl JobSource for JsonFileJobSource {
    async fn load_all(&self) -> SearchResult<Vec<JobPosting>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            SearchError::SourceLoadFailure(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let jobs: Vec<JobPosting> = serde_json::from_slice(&bytes).map_err(|e| {
            SearchError::SourceLoadFailure(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %self.path.display(), jobs = jobs.len(), "Job source loaded");
        Ok(jobs)
    }
}

/// Postings held in memory (for testing and embedding)
#[derive(Debug, Clone, Default)]
pub struct StaticJobSource {
    jobs: Vec<JobPosting>,
}

impl StaticJobSource {
    pub fn new(jobs: Vec<JobPosting>) -> Self {
        Self { jobs }
    }
}

#[async_trait]
impl JobSource for StaticJobSource {
    async fn load_all(&self) -> SearchResult<Vec<JobPosting>> {
        Ok(self.jobs.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_load_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": 1, "title": "Backend Engineer", "company": "Acme",
                  "location": {{"city": "Austin", "department": {{"isoCode": "US"}}}}}},
                {{"id": 2, "title": "Backend Engineer II", "company": "Acme",
                  "location": {{"city": "Paris", "department": {{"isoCode": "FR"}}}}}}
            ]"#
        )
        .unwrap();

        let source = JsonFileJobSource::new(file.path());
        let jobs = source.load_all().await.unwrap();

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, 1);
        assert_eq!(jobs[1].iso_code(), "FR");
    }

    #[tokio::test]
    async fn test_missing_file_is_source_failure() {
        let source = JsonFileJobSource::new("/nonexistent/jobs.json");
        let err = source.load_all().await.unwrap_err();
        assert!(matches!(err, SearchError::SourceLoadFailure(_)));
    }

    #[tokio::test]
    async fn test_malformed_file_is_source_failure() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"not": "an array"}}"#).unwrap();

        let source = JsonFileJobSource::new(file.path());
        let err = source.load_all().await.unwrap_err();
        assert!(matches!(err, SearchError::SourceLoadFailure(_)));
    }
}
