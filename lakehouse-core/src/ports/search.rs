// lakehouse-core/src/ports/search.rs

use async_trait::async_trait;

use crate::domain::search::{CollectionSchema, ProjectDocument, SearchQuery, SearchResponse};
use crate::error::LakehouseError;

#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Creates the collection if missing. Returns `true` when it was created.
    async fn ensure_collection(&self, schema: &CollectionSchema) -> Result<bool, LakehouseError>;

    /// Upserts by document id. Returns the number of accepted documents.
    async fn upsert_documents(&self, documents: &[ProjectDocument])
    -> Result<usize, LakehouseError>;

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, LakehouseError>;

    async fn count_documents(&self) -> Result<u64, LakehouseError>;

    fn engine_name(&self) -> &str;
}
