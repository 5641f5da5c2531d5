// lakehouse-core/src/infrastructure/adapters/memory_search.rs
//
// Process-local search engine for demos and tests. Same contract as the HTTP engine:
// upsert by id, token match on title/abstract, exact facet filters, facet counts.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;

use crate::domain::search::{
    CollectionSchema, FacetCounts, FacetValue, ProjectDocument, SearchHit, SearchQuery,
    SearchResponse,
};
use crate::error::LakehouseError;
use crate::infrastructure::error::{InfrastructureError, SearchError};
use crate::ports::search::SearchEngine;

#[derive(Default)]
pub struct MemorySearchEngine {
    collection: RwLock<Option<CollectionSchema>>,
    documents: RwLock<BTreeMap<String, ProjectDocument>>,
}

impl MemorySearchEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Share of query tokens found in the document text, 0 when nothing matches.
fn text_score(query_tokens: &HashSet<String>, doc: &ProjectDocument) -> f64 {
    let doc_tokens = tokens(&format!("{} {}", doc.title, doc.abstract_text));
    let matched = query_tokens.iter().filter(|t| doc_tokens.contains(*t)).count();
    matched as f64 / query_tokens.len().max(1) as f64
}

fn cosine(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm = |v: &[f32]| v.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let denom = norm(a) * norm(b);
    (denom > 0.0).then(|| dot / denom)
}

fn facet(field: &str, values: impl Iterator<Item = String>) -> FacetCounts {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut counts: Vec<FacetValue> = counts
        .into_iter()
        .map(|(value, count)| FacetValue { value, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    FacetCounts {
        field: field.to_string(),
        counts,
    }
}

#[async_trait]
impl SearchEngine for MemorySearchEngine {
    async fn ensure_collection(&self, schema: &CollectionSchema) -> Result<bool, LakehouseError> {
        let mut collection = self.collection.write().await;
        if collection.is_some() {
            return Ok(false);
        }
        *collection = Some(schema.clone());
        Ok(true)
    }

    async fn upsert_documents(
        &self,
        documents: &[ProjectDocument],
    ) -> Result<usize, LakehouseError> {
        if self.collection.read().await.is_none() {
            return Err(LakehouseError::Infrastructure(InfrastructureError::Search(
                SearchError::collection("collection does not exist"),
            )));
        }
        let mut store = self.documents.write().await;
        for doc in documents {
            store.insert(doc.id.clone(), doc.clone());
        }
        Ok(documents.len())
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, LakehouseError> {
        let store = self.documents.read().await;
        let query_tokens = tokens(&query.text);

        let filtered: Vec<&ProjectDocument> = store
            .values()
            .filter(|d| query.country.is_none() || d.country == query.country)
            .filter(|d| query.year.is_none() || d.year == query.year)
            .collect();

        let mut hits: Vec<SearchHit> = filtered
            .iter()
            .filter_map(|doc| {
                let score = match (&query.vector, &doc.embedding) {
                    (Some(q), Some(e)) => cosine(q, e)?,
                    _ if query.is_match_all() => 1.0,
                    _ => {
                        let score = text_score(&query_tokens, doc);
                        if score == 0.0 {
                            return None;
                        }
                        score
                    }
                };
                Some(SearchHit {
                    document: ProjectDocument {
                        embedding: None,
                        ..(*doc).clone()
                    },
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.document.id.cmp(&b.document.id))
        });
        let found = hits.len() as u64;

        let facets = vec![
            facet(
                "country",
                hits.iter().filter_map(|h| h.document.country.clone()),
            ),
            facet(
                "year",
                hits.iter().filter_map(|h| h.document.year.map(|y| y.to_string())),
            ),
        ];
        hits.truncate(query.limit);

        Ok(SearchResponse {
            found,
            hits,
            facets,
        })
    }

    async fn count_documents(&self) -> Result<u64, LakehouseError> {
        Ok(self.documents.read().await.len() as u64)
    }

    fn engine_name(&self) -> &str {
        "memory"
    }
}
