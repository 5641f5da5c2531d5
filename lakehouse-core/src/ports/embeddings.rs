// lakehouse-core/src/ports/embeddings.rs

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::LakehouseError;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Vectors keyed by the ids of `inputs` (`(id, text)` pairs). Ids the provider
    /// has no vector for are absent from the result.
    async fn embeddings_for(
        &self,
        inputs: &[(String, String)],
    ) -> Result<HashMap<String, Vec<f32>>, LakehouseError>;

    /// Vector of a free-text query, `None` when the provider cannot embed queries.
    async fn embed_query(&self, text: &str) -> Result<Option<Vec<f32>>, LakehouseError>;

    fn dimensions(&self) -> Option<usize>;
}
