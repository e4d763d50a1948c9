//! Search configuration

use crate::search::document::{DEPARTMENT_AGGREGATION, DEPARTMENT_KEYWORD_FIELD, TITLE_FIELD};
use crate::search::query::Fuzziness;
use serde::{Deserialize, Serialize};

/// Search service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Name of the index holding job postings
    pub index_name: String,

    /// Text fields matched by keyword searches
    pub search_fields: Vec<String>,

    /// Edit distance policy for keyword searches
    pub fuzziness: Fuzziness,

    /// Maximum documents returned by a keyword search
    pub search_limit: usize,

    /// Exact field used for department filtering and bucketing
    pub department_field: String,

    /// Name of the department aggregation
    pub aggregation_name: String,

    /// Maximum documents returned alongside a department count
    pub aggregation_result_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_name: "jobs_search".to_string(),
            search_fields: vec![TITLE_FIELD.to_string()],
            fuzziness: Fuzziness::Auto,
            search_limit: 100,
            department_field: DEPARTMENT_KEYWORD_FIELD.to_string(),
            aggregation_name: DEPARTMENT_AGGREGATION.to_string(),
            aggregation_result_limit: 1000,
        }
    }
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn index_name(mut self, name: impl Into<String>) -> Self {
        self.config.index_name = name.into();
        self
    }

    pub fn search_fields(mut self, fields: Vec<String>) -> Self {
        self.config.search_fields = fields;
        self
    }

    pub fn fuzziness(mut self, fuzziness: Fuzziness) -> Self {
        self.config.fuzziness = fuzziness;
        self
    }

    pub fn search_limit(mut self, limit: usize) -> Self {
        self.config.search_limit = limit;
        self
    }

    pub fn department_field(mut self, field: impl Into<String>) -> Self {
        self.config.department_field = field.into();
        self
    }

    pub fn aggregation_name(mut self, name: impl Into<String>) -> Self {
        self.config.aggregation_name = name.into();
        self
    }

    pub fn aggregation_result_limit(mut self, limit: usize) -> Self {
        self.config.aggregation_result_limit = limit;
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
