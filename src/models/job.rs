use serde::{Deserialize, Serialize};

/// A job posting as stored in the canonical source and in the search index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    /// Unique identifier
    pub id: i64,

    /// Position title
    pub title: String,

    /// Hiring company
    pub company: String,

    /// Where the position is located
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub department: Department,
}

/// Geographic department, keyed by its ISO code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    #[serde(rename = "isoCode")]
    pub iso_code: String,
}

impl JobPosting {
    /// Create a new job posting
    pub fn new(
        id: i64,
        title: impl Into<String>,
        company: impl Into<String>,
        city: impl Into<String>,
        iso_code: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            company: company.into(),
            location: Location {
                city: city.into(),
                department: Department {
                    iso_code: iso_code.into(),
                },
            },
        }
    }

    /// Identifier used for the document inside the index
    pub fn document_id(&self) -> String {
        self.id.to_string()
    }

    /// ISO code of the department the posting belongs to
    pub fn iso_code(&self) -> &str {
        &self.location.department.iso_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_posting_wire_format() {
        let job = JobPosting::new(7, "Backend Engineer", "Acme", "Lyon", "69");
        let value = serde_json::to_value(&job).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["title"], "Backend Engineer");
        assert_eq!(value["location"]["city"], "Lyon");
        assert_eq!(value["location"]["department"]["isoCode"], "69");
    }

    #[test]
    fn test_job_posting_from_source_json() {
        let raw = r#"{
            "id": 3,
            "title": "Data Analyst",
            "company": "Globex",
            "location": { "city": "Paris", "department": { "isoCode": "75" } }
        }"#;

        let job: JobPosting = serde_json::from_str(raw).unwrap();
        assert_eq!(job.id, 3);
        assert_eq!(job.iso_code(), "75");
        assert_eq!(job.document_id(), "3");
    }

    #[test]
    fn test_missing_department_is_rejected() {
        let raw = r#"{"id": 1, "title": "x", "company": "y", "location": {"city": "z"}}"#;
        assert!(serde_json::from_str::<JobPosting>(raw).is_err());
    }
}
