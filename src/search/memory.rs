//! In-process index store
//!
//! Mirrors the observable behaviour of the external engine closely enough for
//! development and tests: analyzed text fields with fuzzy matching, exact
//! `.keyword` sub-fields, term filters and terms aggregations.

use crate::search::error::{SearchError, SearchResult};
use crate::search::store::{
    AggregateResponse, Bucket, IndexStore, MultiMatch, RawHit, StoreHealth, TermFilter,
    TermsAggregation,
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::cmp::min;
use std::collections::HashMap;
use std::sync::Arc;

const KEYWORD_SUFFIX: &str = ".keyword";

#[derive(Debug, Default)]
struct MemoryIndex {
    /// Documents in insertion order
    documents: Vec<(String, serde_json::Value)>,
}

impl MemoryIndex {
    fn upsert(&mut self, id: &str, document: serde_json::Value) {
        match self.documents.iter_mut().find(|(doc_id, _)| doc_id == id) {
            Some(entry) => entry.1 = document,
            None => self.documents.push((id.to_string(), document)),
        }
    }
}

/// In-memory index store (for development and testing)
#[derive(Clone, Default)]
pub struct InMemoryIndexStore {
    indices: Arc<DashMap<String, MemoryIndex>>,
}

impl InMemoryIndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held by an index
    pub fn document_count(&self, index: &str) -> Option<usize> {
        self.indices.get(index).map(|idx| idx.documents.len())
    }

    fn not_found(index: &str) -> SearchError {
        SearchError::IndexNotFound(index.to_string())
    }
}

#[async_trait]
impl IndexStore for InMemoryIndexStore {
    async fn index_exists(&self, index: &str) -> SearchResult<bool> {
        Ok(self.indices.contains_key(index))
    }

    async fn delete_index(&self, index: &str) -> SearchResult<()> {
        self.indices
            .remove(index)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(index))?;
        tracing::debug!(index = %index, "Index deleted");
        Ok(())
    }

    async fn create_index(&self, index: &str) -> SearchResult<()> {
        use dashmap::mapref::entry::Entry;

        match self.indices.entry(index.to_string()) {
            Entry::Occupied(_) => Err(SearchError::StoreUnavailable(format!(
                "resource_already_exists: index {} already exists",
                index
            ))),
            Entry::Vacant(entry) => {
                entry.insert(MemoryIndex::default());
                tracing::debug!(index = %index, "Index created");
                Ok(())
            }
        }
    }

    async fn insert_document(
        &self,
        index: &str,
        id: &str,
        document: &serde_json::Value,
    ) -> SearchResult<()> {
        let mut idx = self
            .indices
            .get_mut(index)
            .ok_or_else(|| Self::not_found(index))?;
        idx.upsert(id, document.clone());
        Ok(())
    }

    async fn search(&self, index: &str, query: &MultiMatch) -> SearchResult<Vec<RawHit>> {
        let idx = self.indices.get(index).ok_or_else(|| Self::not_found(index))?;

        let query_terms = analyze(&query.text);
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f64, RawHit)> = idx
            .documents
            .iter()
            .filter_map(|(id, doc)| {
                let doc_terms: Vec<String> = query
                    .fields
                    .iter()
                    .flat_map(|field| field_terms(doc, field))
                    .collect();

                let score: f64 = query_terms
                    .iter()
                    .filter_map(|term| {
                        let max_edits = query.fuzziness.max_edits(term.chars().count());
                        doc_terms
                            .iter()
                            .filter_map(|candidate| edit_distance_within(term, candidate, max_edits))
                            .min()
                            .map(|edits| 1.0 / (1.0 + edits as f64))
                    })
                    .sum();

                (score > 0.0).then(|| {
                    (
                        score,
                        RawHit {
                            id: Some(id.clone()),
                            source: doc.clone(),
                        },
                    )
                })
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(query.size)
            .map(|(_, hit)| hit)
            .collect())
    }

    async fn aggregate(
        &self,
        index: &str,
        filter: &TermFilter,
        aggregation: &TermsAggregation,
        size: usize,
    ) -> SearchResult<AggregateResponse> {
        let idx = self.indices.get(index).ok_or_else(|| Self::not_found(index))?;

        let matching: Vec<&(String, serde_json::Value)> = idx
            .documents
            .iter()
            .filter(|(_, doc)| field_terms(doc, &filter.field).contains(&filter.value))
            .collect();

        let mut counts: HashMap<String, u64> = HashMap::new();
        for (_, doc) in &matching {
            for key in field_terms(doc, &aggregation.field) {
                *counts.entry(key).or_insert(0) += 1;
            }
        }

        let mut buckets: Vec<Bucket> = counts
            .into_iter()
            .map(|(key, doc_count)| Bucket { key, doc_count })
            .collect();
        buckets.sort_by(|a, b| b.doc_count.cmp(&a.doc_count).then_with(|| a.key.cmp(&b.key)));

        let hits = matching
            .into_iter()
            .take(size)
            .map(|(id, doc)| RawHit {
                id: Some(id.clone()),
                source: doc.clone(),
            })
            .collect();

        Ok(AggregateResponse {
            aggregations: HashMap::from([(aggregation.name.clone(), buckets)]),
            hits,
        })
    }

    async fn health(&self) -> SearchResult<StoreHealth> {
        Ok(StoreHealth {
            engine: "in-memory".to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        })
    }
}

/// Lowercased alphanumeric tokens
fn analyze(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
        .collect()
}

/// Terms of a field: raw leaf values for `.keyword` paths, analyzed tokens otherwise
fn field_terms(doc: &serde_json::Value, path: &str) -> Vec<String> {
    let (path, exact) = match path.strip_suffix(KEYWORD_SUFFIX) {
        Some(stripped) => (stripped, true),
        None => (path, false),
    };

    let pointer = format!("/{}", path.replace('.', "/"));
    let mut leaves = Vec::new();
    if let Some(value) = doc.pointer(&pointer) {
        collect_leaves(value, &mut leaves);
    }

    if exact {
        leaves
    } else {
        leaves.iter().flat_map(|leaf| analyze(leaf)).collect()
    }
}

fn collect_leaves(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::String(s) => out.push(s.clone()),
        serde_json::Value::Number(n) => out.push(n.to_string()),
        serde_json::Value::Bool(b) => out.push(b.to_string()),
        serde_json::Value::Array(items) => items.iter().for_each(|item| collect_leaves(item, out)),
        serde_json::Value::Null | serde_json::Value::Object(_) => {}
    }
}

/// Edit distance (adjacent transpositions count as one edit), or `None` if it
/// exceeds `threshold`.
#[allow(clippy::needless_range_loop)]
fn edit_distance_within(s1: &str, s2: &str, threshold: usize) -> Option<usize> {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    let (len1, len2) = (a.len(), b.len());

    if len1.abs_diff(len2) > threshold {
        return None;
    }
    if len1 == 0 || len2 == 0 {
        let distance = len1.max(len2);
        return (distance <= threshold).then_some(distance);
    }

    let mut matrix = vec![vec![0usize; len2 + 1]; len1 + 1];
    for i in 0..=len1 {
        matrix[i][0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    for i in 1..=len1 {
        let mut min_in_row = usize::MAX;
        for j in 1..=len2 {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut value = min(
                min(matrix[i - 1][j] + 1, matrix[i][j - 1] + 1),
                matrix[i - 1][j - 1] + cost,
            );
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                value = min(value, matrix[i - 2][j - 2] + 1);
            }
            matrix[i][j] = value;
            min_in_row = min(min_in_row, value);
        }
        if min_in_row > threshold {
            return None;
        }
    }

    let distance = matrix[len1][len2];
    (distance <= threshold).then_some(distance)
}
