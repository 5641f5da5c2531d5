// lakehouse-core/src/application/indexing.rs
//
// Gold `dim_project` -> search collection. Embeddings are optional: without a provider,
// or when it fails, documents are indexed for full text only.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::domain::gold::{GoldTable, ProjectDim};
use crate::domain::search::{CollectionSchema, ProjectDocument};
use crate::error::LakehouseError;
use crate::infrastructure::adapters::parquet::read_records;
use crate::infrastructure::fs::{load_json, save_json};
use crate::ports::embeddings::EmbeddingProvider;
use crate::ports::search::SearchEngine;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CachedEmbedding {
    hash: String,
    vector: Vec<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexOutcome {
    pub documents: usize,
    pub embedded: usize,
    pub reused: usize,
    /// Set when documents went out without vectors because the provider failed.
    pub degraded: Option<String>,
}

pub struct IndexSettings<'a> {
    pub gold_dir: &'a Path,
    pub state_dir: &'a Path,
    pub collection: &'a str,
    pub batch_size: usize,
}

fn text_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

fn cache_path(state_dir: &Path) -> PathBuf {
    state_dir.join("embedding_cache.json")
}

pub fn load_documents(gold_dir: &Path) -> Result<Vec<ProjectDocument>, LakehouseError> {
    let path = gold_dir.join(GoldTable::DimProject.file_name());
    if !path.exists() {
        return Err(LakehouseError::NotFound(path.display().to_string()));
    }
    let rows: Vec<ProjectDim> = read_records(&path)?;
    Ok(rows.iter().map(ProjectDocument::from_dimension).collect())
}

/// Attaches vectors to `documents`, asking the provider only for texts it has not seen.
/// Returns the number of fresh and reused vectors.
async fn attach_embeddings(
    documents: &mut [ProjectDocument],
    provider: &dyn EmbeddingProvider,
    state_dir: &Path,
) -> Result<(usize, usize), LakehouseError> {
    let path = cache_path(state_dir);
    let mut cache: BTreeMap<String, CachedEmbedding> = load_json(&path)?.unwrap_or_default();

    let hashes: Vec<String> = documents.iter().map(|d| text_hash(&d.embedding_text())).collect();
    let pending: Vec<(String, String)> = documents
        .iter()
        .zip(&hashes)
        .filter(|(doc, hash)| cache.get(&doc.id).is_none_or(|c| &c.hash != *hash))
        .map(|(doc, _)| (doc.id.clone(), doc.embedding_text()))
        .collect();

    let fresh: HashMap<String, Vec<f32>> = if pending.is_empty() {
        HashMap::new()
    } else {
        provider.embeddings_for(&pending).await?
    };
    let embedded = fresh.len();

    let mut reused = 0;
    for (doc, hash) in documents.iter_mut().zip(hashes) {
        if let Some(vector) = fresh.get(&doc.id) {
            cache.insert(
                doc.id.clone(),
                CachedEmbedding {
                    hash,
                    vector: vector.clone(),
                },
            );
            doc.embedding = Some(vector.clone());
        } else if let Some(cached) = cache.get(&doc.id).filter(|c| c.hash == hash) {
            doc.embedding = Some(cached.vector.clone());
            reused += 1;
        }
    }

    // Forget projects that left the Gold zone
    let live: std::collections::HashSet<&str> = documents.iter().map(|d| d.id.as_str()).collect();
    cache.retain(|id, _| live.contains(id.as_str()));
    save_json(&path, &cache)?;

    Ok((embedded, reused))
}

/// Creates the collection if needed. Vector size comes from the provider, or from the
/// documents when the provider does not announce it.
pub async fn ensure_collection(
    engine: &dyn SearchEngine,
    collection: &str,
    dimensions: Option<usize>,
) -> Result<bool, LakehouseError> {
    let schema = CollectionSchema::projects(collection, dimensions);
    let created = engine.ensure_collection(&schema).await?;
    if created {
        info!(collection, engine = engine.engine_name(), "Search collection created");
    }
    Ok(created)
}

#[instrument(skip_all, fields(collection = settings.collection))]
pub async fn index_projects(
    engine: &dyn SearchEngine,
    embeddings: Option<&dyn EmbeddingProvider>,
    settings: &IndexSettings<'_>,
) -> Result<IndexOutcome, LakehouseError> {
    let mut documents = load_documents(settings.gold_dir)?;
    let mut outcome = IndexOutcome {
        documents: documents.len(),
        ..Default::default()
    };

    match embeddings {
        Some(provider) => match attach_embeddings(&mut documents, provider, settings.state_dir).await {
            Ok((embedded, reused)) => {
                outcome.embedded = embedded;
                outcome.reused = reused;
            }
            Err(e) => {
                warn!(error = %e, "Embedding provider failed, indexing without vectors");
                for doc in &mut documents {
                    doc.embedding = None;
                }
                outcome.degraded = Some(e.to_string());
            }
        },
        None => info!("No embedding provider configured, full text only"),
    }

    let dimensions = embeddings
        .and_then(|p| p.dimensions())
        .or_else(|| documents.iter().find_map(|d| d.embedding.as_ref().map(Vec::len)));
    ensure_collection(engine, settings.collection, dimensions).await?;

    let mut upserted = 0;
    for batch in documents.chunks(settings.batch_size.max(1)) {
        upserted += engine.upsert_documents(batch).await?;
    }
    info!(
        documents = upserted,
        embedded = outcome.embedded,
        reused = outcome.reused,
        "Projects indexed"
    );
    outcome.documents = upserted;
    Ok(outcome)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::search::SearchQuery;
    use crate::domain::table::TableData;
    use crate::infrastructure::adapters::MemorySearchEngine;
    use crate::infrastructure::adapters::parquet::write_table;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    struct CountingEmbedder {
        requested: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl EmbeddingProvider for CountingEmbedder {
        async fn embeddings_for(
            &self,
            inputs: &[(String, String)],
        ) -> Result<HashMap<String, Vec<f32>>, LakehouseError> {
            if self.fail {
                return Err(LakehouseError::InternalError("embedder down".into()));
            }
            let mut requested = self.requested.lock().unwrap();
            Ok(inputs
                .iter()
                .map(|(id, _)| {
                    requested.push(id.clone());
                    (id.clone(), vec![1.0, 0.0])
                })
                .collect())
        }

        async fn embed_query(&self, _text: &str) -> Result<Option<Vec<f32>>, LakehouseError> {
            Ok(Some(vec![1.0, 0.0]))
        }

        fn dimensions(&self) -> Option<usize> {
            Some(2)
        }
    }

    fn project(sk: i64, id: &str, title: &str) -> ProjectDim {
        ProjectDim {
            project_sk: sk,
            project_id: id.into(),
            acronym: None,
            title: Some(title.into()),
            abstract_text: None,
            status: None,
            start_date: None,
            end_date: None,
            duration_days: None,
            total_cost: None,
            ec_max_contribution: None,
            framework_programme: None,
            country: Some("DE".into()),
            year: Some(2022),
            science_fields: None,
        }
    }

    fn publish(gold: &Path, rows: &[ProjectDim]) -> Result<()> {
        write_table(&gold.join("dim_project.parquet"), &TableData::from_records(rows))?;
        Ok(())
    }

    #[tokio::test]
    async fn test_unchanged_texts_are_not_embedded_again() -> Result<()> {
        let dir = tempdir()?;
        let engine = MemorySearchEngine::new();
        let requested = Arc::new(Mutex::new(Vec::new()));
        let embedder = CountingEmbedder {
            requested: requested.clone(),
            fail: false,
        };
        let settings = IndexSettings {
            gold_dir: dir.path(),
            state_dir: dir.path(),
            collection: "projects",
            batch_size: 1,
        };

        publish(dir.path(), &[project(1, "P1", "Solar"), project(2, "P2", "Wind")])?;
        let first = index_projects(&engine, Some(&embedder), &settings).await?;
        assert_eq!(first.embedded, 2);

        publish(dir.path(), &[project(1, "P1", "Solar"), project(2, "P2", "Offshore wind")])?;
        let second = index_projects(&engine, Some(&embedder), &settings).await?;

        assert_eq!(second.embedded, 1);
        assert_eq!(second.reused, 1);
        assert_eq!(*requested.lock().unwrap(), vec!["P1", "P2", "P2"]);
        assert_eq!(engine.count_documents().await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_embedder_failure_degrades_to_full_text() -> Result<()> {
        let dir = tempdir()?;
        let engine = MemorySearchEngine::new();
        let embedder = CountingEmbedder {
            requested: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        };
        publish(dir.path(), &[project(1, "P1", "Solar storage")])?;

        let outcome = index_projects(
            &engine,
            Some(&embedder),
            &IndexSettings {
                gold_dir: dir.path(),
                state_dir: dir.path(),
                collection: "projects",
                batch_size: 100,
            },
        )
        .await?;

        assert!(outcome.degraded.is_some());
        assert_eq!(outcome.documents, 1);
        let response = engine.search(&SearchQuery::new("solar", None, None, 5)?).await?;
        assert_eq!(response.found, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_gold_table_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let engine = MemorySearchEngine::new();
        let result = index_projects(
            &engine,
            None,
            &IndexSettings {
                gold_dir: dir.path(),
                state_dir: dir.path(),
                collection: "projects",
                batch_size: 100,
            },
        )
        .await;
        assert!(matches!(result, Err(LakehouseError::NotFound(_))));
        Ok(())
    }

    #[test]
    fn test_text_hash_is_hex_sha256() {
        let hash = text_hash("solar");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, text_hash("solar"));
        assert_ne!(hash, text_hash("wind"));
    }
}
