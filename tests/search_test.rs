//! End-to-end tests for the index and query layer over the in-memory store

use job_search::models::JobPosting;
use job_search::search::*;
use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio_test::{assert_err, assert_ok};

/// Helper to create a service over a fresh in-memory store
fn create_test_service(jobs: Vec<JobPosting>) -> (SearchService, InMemoryIndexStore) {
    let store = InMemoryIndexStore::new();
    let service = SearchService::new(
        Arc::new(store.clone()),
        Arc::new(StaticJobSource::new(jobs)),
        SearchConfig::default(),
    );
    (service, store)
}

fn scenario_jobs() -> Vec<JobPosting> {
    vec![
        JobPosting::new(1, "Backend Engineer", "Acme", "Austin", "US"),
        JobPosting::new(2, "Backend Engineer II", "Acme", "Paris", "FR"),
    ]
}

fn ids(jobs: &[JobPosting]) -> HashSet<i64> {
    jobs.iter().map(|job| job.id).collect()
}

fn bundled_jobs_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources/jobs.json")
}

#[tokio::test]
async fn test_two_posting_scenario() {
    let (service, _) = create_test_service(scenario_jobs());
    assert_ok!(service.rebuild("jobs").await);

    let found = service.search("jobs", "Backend").await.unwrap();
    assert_eq!(ids(&found), HashSet::from([1, 2]));

    let us = service.aggregate_by_department("jobs", "US").await.unwrap();
    assert_eq!(us.total_count, 1);
    assert_eq!(us.matching_documents.len(), 1);
    assert_eq!(us.matching_documents[0].id, 1);

    let de = service.aggregate_by_department("jobs", "DE").await.unwrap();
    assert_eq!(de.total_count, 0);
    assert!(de.matching_documents.is_empty());
}

#[tokio::test]
async fn test_misspelled_keyword_still_matches() {
    let (service, _) = create_test_service(scenario_jobs());
    service.rebuild("jobs").await.unwrap();

    let found = service.search("jobs", "Enginer").await.unwrap();
    assert_eq!(ids(&found), HashSet::from([1, 2]));
}

#[tokio::test]
async fn test_exact_title_substring_is_found() {
    let (service, _) = create_test_service(vec![
        JobPosting::new(1, "Backend Engineer", "Acme", "Austin", "US"),
        JobPosting::new(2, "Product Designer", "Globex", "Lyon", "FR"),
        JobPosting::new(3, "QA Analyst", "Initech", "Madrid", "ES"),
    ]);
    service.rebuild("jobs").await.unwrap();

    for (keyword, id) in [("Designer", 2), ("Analyst", 3), ("Backend", 1)] {
        let found = service.search("jobs", keyword).await.unwrap();
        assert!(ids(&found).contains(&id), "{keyword} should find job {id}");
    }
}

#[tokio::test]
async fn test_rebuild_twice_has_no_duplicates() {
    let (service, store) = create_test_service(scenario_jobs());

    service.rebuild("jobs").await.unwrap();
    let report = service.rebuild("jobs").await.unwrap();

    assert_eq!(report.documents_indexed, 2);
    assert_eq!(store.document_count("jobs"), Some(2));

    let found = service.search("jobs", "Backend").await.unwrap();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn test_aggregation_count_equals_returned_documents() {
    let jobs = (1..=5)
        .map(|id| JobPosting::new(id, format!("Engineer {id}"), "Acme", "Paris", "FR"))
        .chain([JobPosting::new(6, "Engineer", "Acme", "Austin", "US")])
        .collect();
    let (service, _) = create_test_service(jobs);
    service.rebuild("jobs").await.unwrap();

    let fr = service.aggregate_by_department("jobs", "FR").await.unwrap();
    assert_eq!(fr.total_count, 5);
    assert_eq!(fr.matching_documents.len(), 5);
}

#[tokio::test]
async fn test_aggregation_documents_are_capped() {
    let jobs = (1..=10)
        .map(|id| JobPosting::new(id, "Engineer", "Acme", "Paris", "FR"))
        .collect();
    let store = InMemoryIndexStore::new();
    let service = SearchService::new(
        Arc::new(store),
        Arc::new(StaticJobSource::new(jobs)),
        SearchConfigBuilder::new().aggregation_result_limit(3).build(),
    );
    service.rebuild("jobs").await.unwrap();

    let fr = service.aggregate_by_department("jobs", "FR").await.unwrap();
    assert_eq!(fr.total_count, 10);
    assert_eq!(fr.matching_documents.len(), 3);
}

#[tokio::test]
async fn test_queries_against_missing_index() {
    let (service, _) = create_test_service(scenario_jobs());

    let err = assert_err!(service.search("absent", "Backend").await);
    assert!(matches!(err, SearchError::IndexNotFound(_)));

    let err = assert_err!(service.aggregate_by_department("absent", "US").await);
    assert!(matches!(err, SearchError::IndexNotFound(_)));
}

#[tokio::test]
async fn test_clean_missing_index_does_not_error() {
    let (service, store) = create_test_service(Vec::new());

    assert!(!store.index_exists("fresh").await.unwrap());
    assert_ok!(service.lifecycle().clean_index("fresh").await);
    assert!(store.index_exists("fresh").await.unwrap());
}

#[tokio::test]
async fn test_rebuild_from_json_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"id": 7, "title": "Data Engineer", "company": "Initech",
             "location": {{"city": "Berlin", "department": {{"isoCode": "DE"}}}}}}]"#
    )
    .unwrap();

    let store = InMemoryIndexStore::new();
    let service = SearchService::new(
        Arc::new(store.clone()),
        Arc::new(JsonFileJobSource::new(file.path())),
        SearchConfig::default(),
    );

    let report = service.rebuild("jobs").await.unwrap();
    assert_eq!(report.documents_indexed, 1);

    let de = service.aggregate_by_department("jobs", "DE").await.unwrap();
    assert_eq!(de.total_count, 1);
    assert_eq!(de.matching_documents[0].location.city, "Berlin");
}

#[tokio::test]
async fn test_unreadable_source_keeps_previous_index() {
    let store = InMemoryIndexStore::new();
    let good = SearchService::new(
        Arc::new(store.clone()),
        Arc::new(StaticJobSource::new(scenario_jobs())),
        SearchConfig::default(),
    );
    good.rebuild("jobs").await.unwrap();

    let broken = SearchService::new(
        Arc::new(store.clone()),
        Arc::new(JsonFileJobSource::new("/nonexistent/jobs.json")),
        SearchConfig::default(),
    );
    let err = assert_err!(broken.rebuild("jobs").await);
    assert!(matches!(err, SearchError::SourceLoadFailure(_)));

    let found = good.search("jobs", "Backend").await.unwrap();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn test_bundled_sample_data() {
    let service = SearchService::new(
        create_in_memory_store(),
        Arc::new(JsonFileJobSource::new(bundled_jobs_path())),
        SearchConfig::default(),
    );

    let report = service.rebuild("jobs_search").await.unwrap();
    assert_eq!(report.documents_indexed, 12);

    let found = ids(&service.search("jobs_search", "Enginer").await.unwrap());
    assert!(found.contains(&1));
    assert!(found.contains(&2));
    assert!(!found.contains(&9));

    let fr = service
        .aggregate_by_department("jobs_search", "FR")
        .await
        .unwrap();
    assert_eq!(fr.total_count, 3);
    assert_eq!(ids(&fr.matching_documents), HashSet::from([2, 5, 10]));
}
