//! Query building

use crate::models::JobPosting;
use crate::search::store::{MultiMatch, TermFilter, TermsAggregation};
use serde::{Deserialize, Serialize};

/// Allowed edit distance for text matching
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Fuzziness {
    /// Terms must match exactly
    Exact,

    /// Edit distance chosen from the term length
    #[default]
    Auto,
}

impl Fuzziness {
    /// Maximum number of edits tolerated for a term of `term_len` characters.
    ///
    /// `Auto` follows the usual engine rule: 0 edits up to 2 characters,
    /// 1 edit up to 5 characters, 2 edits beyond.
    pub fn max_edits(&self, term_len: usize) -> usize {
        match self {
            Fuzziness::Exact => 0,
            Fuzziness::Auto => match term_len {
                0..=2 => 0,
                3..=5 => 1,
                _ => 2,
            },
        }
    }

    /// Engine parameter value (`"0"` or `"AUTO"`)
    pub fn as_param(&self) -> &'static str {
        match self {
            Fuzziness::Exact => "0",
            Fuzziness::Auto => "AUTO",
        }
    }
}

/// Fuzzy keyword search over one or more text fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Keyword to look for
    pub keyword: String,

    /// Field paths to search, in order
    pub fields: Vec<String>,

    /// Edit distance policy
    pub fuzziness: Fuzziness,

    /// Maximum number of documents to return
    pub limit: usize,
}

impl SearchQuery {
    /// Create a new search query over the title field
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            fields: vec![crate::search::document::TITLE_FIELD.to_string()],
            fuzziness: Fuzziness::default(),
            limit: 100,
        }
    }

    /// Replace the searched fields
    pub fn with_fields(mut self, fields: Vec<impl Into<String>>) -> Self {
        self.fields = fields.into_iter().map(|f| f.into()).collect();
        self
    }

    /// Set fuzziness
    pub fn with_fuzziness(mut self, fuzziness: Fuzziness) -> Self {
        self.fuzziness = fuzziness;
        self
    }

    /// Set limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Lower to the store request
    pub fn to_multi_match(&self) -> MultiMatch {
        MultiMatch {
            text: self.keyword.clone(),
            fields: self.fields.clone(),
            fuzziness: self.fuzziness,
            size: self.limit,
        }
    }
}

/// "How many postings in department X" with the postings themselves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentFilterQuery {
    /// Department ISO code to filter on
    pub iso_code: String,

    /// Field path used both for the filter and for bucketing
    pub aggregation_field: String,

    /// Name of the aggregation in the engine response
    pub aggregation_name: String,

    /// Upper bound on the number of returned documents
    pub result_limit: usize,
}

impl DepartmentFilterQuery {
    pub fn new(iso_code: impl Into<String>) -> Self {
        Self {
            iso_code: iso_code.into(),
            aggregation_field: crate::search::document::DEPARTMENT_KEYWORD_FIELD.to_string(),
            aggregation_name: crate::search::document::DEPARTMENT_AGGREGATION.to_string(),
            result_limit: 1000,
        }
    }

    pub fn with_aggregation_field(mut self, field: impl Into<String>) -> Self {
        self.aggregation_field = field.into();
        self
    }

    pub fn with_aggregation_name(mut self, name: impl Into<String>) -> Self {
        self.aggregation_name = name.into();
        self
    }

    pub fn with_result_limit(mut self, limit: usize) -> Self {
        self.result_limit = limit;
        self
    }

    /// Term filter restricting hits to the requested department
    pub fn filter(&self) -> TermFilter {
        TermFilter {
            field: self.aggregation_field.clone(),
            value: self.iso_code.clone(),
        }
    }

    /// Terms aggregation over the same field
    pub fn aggregation(&self) -> TermsAggregation {
        TermsAggregation {
            name: self.aggregation_name.clone(),
            field: self.aggregation_field.clone(),
        }
    }
}

/// Grouped count plus the matching documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub total_count: u64,
    pub matching_documents: Vec<JobPosting>,
}

impl AggregationResult {
    pub fn empty() -> Self {
        Self {
            total_count: 0,
            matching_documents: Vec::new(),
        }
    }
}
