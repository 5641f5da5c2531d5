// lakehouse-core/src/infrastructure/adapters/embeddings.rs

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::LakehouseError;
use crate::infrastructure::error::{InfrastructureError, SearchError};
use crate::ports::embeddings::EmbeddingProvider;

pub const DEFAULT_BATCH_SIZE: usize = 128;

fn embedding_err(msg: impl Into<String>) -> LakehouseError {
    LakehouseError::Infrastructure(InfrastructureError::Search(SearchError::embedding(msg)))
}

fn as_vector(value: &Value) -> Option<Vec<f32>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect()
}

/// Accepts `{"embeddings": [[...], ...]}` or a bare list of vectors.
pub fn parse_batch_response(body: &Value) -> Result<Vec<Vec<f32>>, SearchError> {
    let list = body
        .get("embeddings")
        .unwrap_or(body)
        .as_array()
        .ok_or_else(|| SearchError::embedding(format!("unexpected embedder payload: {}", body)))?;
    list.iter()
        .map(|v| as_vector(v).ok_or_else(|| SearchError::embedding("vector is not numeric")))
        .collect()
}

/// Accepts `{"embedding": [...]}`, a batch shaped answer with one vector, or a bare vector.
pub fn parse_query_response(body: &Value) -> Result<Vec<f32>, SearchError> {
    if let Some(vector) = body.get("embedding").and_then(as_vector) {
        return Ok(vector);
    }
    if let Some(vector) = as_vector(body) {
        return Ok(vector);
    }
    parse_batch_response(body)?
        .into_iter()
        .next()
        .ok_or_else(|| SearchError::embedding("embedder returned no vector"))
}

pub struct HttpEmbedder {
    client: Client,
    url: String,
    api_key: Option<String>,
    batch_size: usize,
    dimensions: Option<usize>,
}

impl HttpEmbedder {
    pub fn new(
        url: &str,
        api_key: Option<String>,
        batch_size: usize,
        dimensions: Option<usize>,
        timeout: Duration,
    ) -> Result<Self, InfrastructureError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::embedding(e.to_string()))?;
        Ok(Self {
            client,
            url: url.to_string(),
            api_key,
            batch_size: batch_size.max(1),
            dimensions,
        })
    }

    async fn post(&self, payload: Value) -> Result<Value, LakehouseError> {
        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .await
            .map_err(|e| embedding_err(e.to_string()))?
            .error_for_status()
            .map_err(|e| embedding_err(e.to_string()))?;
        response
            .json::<Value>()
            .await
            .map_err(|e| embedding_err(e.to_string()))
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<(), LakehouseError> {
        match self.dimensions {
            Some(dims) if dims != vector.len() => Err(embedding_err(format!(
                "expected {} dimensions, embedder returned {}",
                dims,
                vector.len()
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbedder {
    #[instrument(skip_all, fields(inputs = inputs.len()))]
    async fn embeddings_for(
        &self,
        inputs: &[(String, String)],
    ) -> Result<HashMap<String, Vec<f32>>, LakehouseError> {
        let mut vectors = HashMap::with_capacity(inputs.len());
        for chunk in inputs.chunks(self.batch_size) {
            let texts: Vec<&str> = chunk.iter().map(|(_, text)| text.as_str()).collect();
            let body = self.post(json!({ "inputs": texts })).await?;
            let batch = parse_batch_response(&body)
                .map_err(|e| LakehouseError::Infrastructure(InfrastructureError::Search(e)))?;
            if batch.len() != chunk.len() {
                return Err(embedding_err(format!(
                    "sent {} texts, received {} vectors",
                    chunk.len(),
                    batch.len()
                )));
            }
            for ((id, _), vector) in chunk.iter().zip(batch) {
                self.check_dimensions(&vector)?;
                vectors.insert(id.clone(), vector);
            }
            debug!(batch = chunk.len(), "Embedding batch received");
        }
        Ok(vectors)
    }

    async fn embed_query(&self, text: &str) -> Result<Option<Vec<f32>>, LakehouseError> {
        let body = self.post(json!({ "input": text })).await?;
        let vector = parse_query_response(&body)
            .map_err(|e| LakehouseError::Infrastructure(InfrastructureError::Search(e)))?;
        self.check_dimensions(&vector)?;
        Ok(Some(vector))
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }
}

/// Vectors computed outside the pipeline, stored as a JSON object `project_id -> [f32]`.
pub struct FileEmbeddings {
    vectors: HashMap<String, Vec<f32>>,
    dimensions: Option<usize>,
}

impl FileEmbeddings {
    pub fn load(path: &Path) -> Result<Self, InfrastructureError> {
        let content = std::fs::read_to_string(path)?;
        let vectors: HashMap<String, Vec<f32>> = serde_json::from_str(&content)?;
        let dimensions = vectors.values().next().map(Vec::len);
        if let Some(dims) = dimensions
            && vectors.values().any(|v| v.len() != dims)
        {
            return Err(SearchError::embedding(format!(
                "{} mixes vector sizes",
                path.display()
            ))
            .into());
        }
        Ok(Self {
            vectors,
            dimensions,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for FileEmbeddings {
    async fn embeddings_for(
        &self,
        inputs: &[(String, String)],
    ) -> Result<HashMap<String, Vec<f32>>, LakehouseError> {
        Ok(inputs
            .iter()
            .filter_map(|(id, _)| self.vectors.get(id).map(|v| (id.clone(), v.clone())))
            .collect())
    }

    async fn embed_query(&self, _text: &str) -> Result<Option<Vec<f32>>, LakehouseError> {
        Ok(None)
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }
}
