//! Error types for index and query operations

use crate::error::AppError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while rebuilding or querying an index
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Connectivity or protocol failure talking to the index store
    #[error("Index store unavailable: {0}")]
    StoreUnavailable(String),

    /// The targeted index does not exist
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// The canonical document source could not be read or parsed
    #[error("Document source load failed: {0}")]
    SourceLoadFailure(String),

    /// A raw hit could not be mapped to a job posting
    #[error("Document decode failed: {0}")]
    DecodeFailure(String),

    /// The requested aggregation is absent from the engine response
    #[error("Aggregation missing from response: {0}")]
    AggregationMissing(String),
}

impl SearchError {
    /// Stable error code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            SearchError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            SearchError::IndexNotFound(_) => "INDEX_NOT_FOUND",
            SearchError::SourceLoadFailure(_) => "SOURCE_LOAD_FAILURE",
            SearchError::DecodeFailure(_) => "DECODE_FAILURE",
            SearchError::AggregationMissing(_) => "AGGREGATION_MISSING",
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::StoreUnavailable(err.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        AppError::Search(err)
    }
}
