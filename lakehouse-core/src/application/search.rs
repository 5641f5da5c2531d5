// lakehouse-core/src/application/search.rs

use tracing::{debug, warn};

use crate::domain::search::{SearchQuery, SearchResponse};
use crate::error::LakehouseError;
use crate::ports::embeddings::EmbeddingProvider;
use crate::ports::search::SearchEngine;

/// Full-text search with facet filters. With `use_vector`, the query text is embedded
/// first; a provider that cannot embed falls back to full text.
pub async fn search_projects(
    engine: &dyn SearchEngine,
    embeddings: Option<&dyn EmbeddingProvider>,
    mut query: SearchQuery,
    use_vector: bool,
) -> Result<SearchResponse, LakehouseError> {
    if use_vector && !query.is_match_all() {
        match embeddings {
            Some(provider) => match provider.embed_query(&query.text).await {
                Ok(Some(vector)) => {
                    debug!(dims = vector.len(), "Vector query");
                    query.vector = Some(vector);
                }
                Ok(None) => debug!("Provider cannot embed queries, using full text"),
                Err(e) => warn!(error = %e, "Query embedding failed, using full text"),
            },
            None => debug!("No embedding provider, using full text"),
        }
    }
    engine.search(&query).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::search::{CollectionSchema, ProjectDocument};
    use crate::infrastructure::adapters::MemorySearchEngine;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FixedEmbedder(Option<Vec<f32>>);

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embeddings_for(
            &self,
            _inputs: &[(String, String)],
        ) -> Result<HashMap<String, Vec<f32>>, LakehouseError> {
            Ok(HashMap::new())
        }

        async fn embed_query(&self, _text: &str) -> Result<Option<Vec<f32>>, LakehouseError> {
            Ok(self.0.clone())
        }

        fn dimensions(&self) -> Option<usize> {
            Some(2)
        }
    }

    fn doc(id: &str, title: &str, embedding: Vec<f32>) -> ProjectDocument {
        ProjectDocument {
            id: id.into(),
            project_id: id.into(),
            title: title.into(),
            abstract_text: String::new(),
            country: Some("FR".into()),
            year: Some(2023),
            embedding: Some(embedding),
        }
    }

    async fn engine() -> Result<MemorySearchEngine> {
        let engine = MemorySearchEngine::new();
        engine
            .ensure_collection(&CollectionSchema::projects("projects", Some(2)))
            .await?;
        engine
            .upsert_documents(&[
                doc("P1", "Photovoltaic panels", vec![1.0, 0.0]),
                doc("P2", "Solar thermal", vec![0.0, 1.0]),
            ])
            .await?;
        Ok(engine)
    }

    #[tokio::test]
    async fn test_vector_query_ranks_by_similarity() -> Result<()> {
        let engine = engine().await?;
        let embedder = FixedEmbedder(Some(vec![0.9, 0.1]));

        let query = SearchQuery::new("solar", None, None, 10)?;
        let response = search_projects(&engine, Some(&embedder), query, true).await?;

        assert_eq!(response.hits[0].document.id, "P1");
        assert_eq!(response.found, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_falls_back_to_full_text() -> Result<()> {
        let engine = engine().await?;
        let embedder = FixedEmbedder(None);

        let query = SearchQuery::new("solar", None, None, 10)?;
        let response = search_projects(&engine, Some(&embedder), query, true).await?;

        assert_eq!(response.found, 1);
        assert_eq!(response.hits[0].document.id, "P2");
        Ok(())
    }
}
