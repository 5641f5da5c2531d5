// lakehouse-core/src/application/services.rs
//
// Adapter wiring for one project directory. Everything downstream takes ports, not adapters.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::project::{LakehouseConfig, SearchBackend};
use crate::error::LakehouseError;
use crate::infrastructure::adapters::embeddings::{DEFAULT_BATCH_SIZE, FileEmbeddings, HttpEmbedder};
use crate::infrastructure::adapters::{DuckDbWarehouse, MemorySearchEngine, TypesenseEngine};
use crate::infrastructure::config::load_lakehouse_config;
use crate::infrastructure::fs::{LakeLayout, absolutize};
use crate::ports::{EmbeddingProvider, SearchEngine, Warehouse};

pub struct LakehouseServices {
    pub config: LakehouseConfig,
    pub layout: LakeLayout,
    pub warehouse: Arc<dyn Warehouse>,
    pub search: Option<Arc<dyn SearchEngine>>,
    pub embeddings: Option<Arc<dyn EmbeddingProvider>>,
    /// Held for the whole duration of a pipeline run.
    pub run_lock: Mutex<()>,
}

impl LakehouseServices {
    pub fn new(
        config: LakehouseConfig,
        layout: LakeLayout,
        warehouse: Arc<dyn Warehouse>,
        search: Option<Arc<dyn SearchEngine>>,
        embeddings: Option<Arc<dyn EmbeddingProvider>>,
    ) -> Self {
        Self {
            config,
            layout,
            warehouse,
            search,
            embeddings,
            run_lock: Mutex::new(()),
        }
    }

    pub fn open(project_dir: &Path) -> Result<Self, LakehouseError> {
        let config = load_lakehouse_config(project_dir)?;
        Self::from_config(project_dir, config)
    }

    pub fn from_config(project_dir: &Path, config: LakehouseConfig) -> Result<Self, LakehouseError> {
        let layout = LakeLayout::resolve(project_dir, &config);
        layout.ensure_dirs()?;

        let warehouse_path = if config.warehouse.path == ":memory:" {
            config.warehouse.path.clone()
        } else {
            absolutize(project_dir, &config.warehouse.path)
                .to_string_lossy()
                .into_owned()
        };
        info!(path = %warehouse_path, "Opening warehouse");
        let warehouse: Arc<dyn Warehouse> = Arc::new(DuckDbWarehouse::new(&warehouse_path)?);

        let timeout = Duration::from_secs(config.search.timeout_secs);
        let search: Option<Arc<dyn SearchEngine>> = match (config.search.enabled, &config.search.backend) {
            (false, _) => None,
            (true, SearchBackend::Memory) => Some(Arc::new(MemorySearchEngine::new())),
            (true, SearchBackend::Typesense) => Some(Arc::new(TypesenseEngine::new(
                &config.search.url,
                config.search.api_key.as_deref().unwrap_or_default(),
                &config.search.collection,
                timeout,
            )?)),
        };

        let embeddings = build_embeddings(project_dir, &config, timeout);

        Ok(Self::new(config, layout, warehouse, search, embeddings))
    }
}

/// An unusable provider only degrades search, it never blocks startup.
fn build_embeddings(
    project_dir: &Path,
    config: &LakehouseConfig,
    timeout: Duration,
) -> Option<Arc<dyn EmbeddingProvider>> {
    let embeddings = &config.embeddings;
    if let Some(url) = &embeddings.url {
        let batch = embeddings.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        // Embedding batches are slower than search calls
        match HttpEmbedder::new(url, embeddings.api_key.clone(), batch, embeddings.dimensions, timeout * 12) {
            Ok(provider) => return Some(Arc::new(provider)),
            Err(e) => warn!(error = %e, "HTTP embedder unavailable"),
        }
    }
    if let Some(file) = &embeddings.file {
        match FileEmbeddings::load(&absolutize(project_dir, file)) {
            Ok(provider) => return Some(Arc::new(provider)),
            Err(e) => warn!(error = %e, file = %file, "Embedding file unavailable"),
        }
    }
    None
}
