// lakehouse-core/src/domain/project/configuration.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Search backend used by the indexer and the `/search` routes.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    #[default]
    Typesense,
    Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct LakehouseConfig {
    #[validate(length(min = 1))]
    pub name: String,

    #[serde(rename = "data-dir", default = "default_data_dir")]
    pub data_dir: String,

    #[serde(rename = "bronze-dir", default)]
    pub bronze_dir: Option<String>,
    #[serde(rename = "silver-dir", default)]
    pub silver_dir: Option<String>,
    #[serde(rename = "gold-dir", default)]
    pub gold_dir: Option<String>,

    /// A missing Bronze file aborts the run instead of producing an empty entity.
    #[serde(rename = "strict-inputs", default)]
    pub strict_inputs: bool,

    /// Extra paths, relative to the project directory, removed by `clean` on top of the
    /// Silver, Gold and runs zones.
    #[serde(rename = "clean-targets", default)]
    pub clean_targets: Vec<String>,

    #[serde(default)]
    pub warehouse: WarehouseConfig,

    #[serde(default)]
    #[validate(nested)]
    pub search: SearchConfig,

    #[serde(default)]
    #[validate(nested)]
    pub embeddings: EmbeddingConfig,

    #[serde(default)]
    #[validate(nested)]
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WarehouseConfig {
    /// DuckDB file, relative to the project directory. `:memory:` is accepted.
    #[serde(default = "default_warehouse_path")]
    pub path: String,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            path: default_warehouse_path(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct SearchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub backend: SearchBackend,

    #[serde(default = "default_search_url")]
    #[validate(url)]
    pub url: String,

    #[serde(rename = "api-key", default)]
    pub api_key: Option<String>,

    #[serde(default = "default_collection")]
    #[validate(length(min = 1))]
    pub collection: String,

    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,

    #[serde(rename = "batch-size", default = "default_batch_size")]
    #[validate(range(min = 1))]
    pub batch_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: SearchBackend::default(),
            url: default_search_url(),
            api_key: None,
            collection: default_collection(),
            timeout_secs: default_timeout_secs(),
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, Validate)]
pub struct EmbeddingConfig {
    /// HTTP embedder; `{"inputs": [...]}` in, `{"embeddings": [...]}` or a bare list out.
    #[validate(url)]
    pub url: Option<String>,

    #[serde(rename = "api-key", default)]
    pub api_key: Option<String>,

    /// JSON object `project_id -> vector` produced outside the pipeline.
    pub file: Option<String>,

    #[serde(default)]
    #[validate(range(min = 1, max = 8192))]
    pub dimensions: Option<usize>,

    #[serde(rename = "batch-size", default)]
    #[validate(range(min = 1))]
    pub batch_size: Option<usize>,
}

impl EmbeddingConfig {
    pub fn is_configured(&self) -> bool {
        self.url.is_some() || self.file.is_some()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ApiConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(rename = "max-upload-mb", default = "default_max_upload_mb")]
    #[validate(range(min = 1, max = 4096))]
    pub max_upload_mb: usize,
}

impl ApiConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            username: None,
            password: None,
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

fn default_data_dir() -> String {
    "lake".to_string()
}
fn default_warehouse_path() -> String {
    "lake/warehouse.duckdb".to_string()
}
fn default_true() -> bool {
    true
}
fn default_search_url() -> String {
    "http://localhost:8108".to_string()
}
fn default_collection() -> String {
    "projects".to_string()
}
fn default_timeout_secs() -> u64 {
    5
}
fn default_batch_size() -> usize {
    500
}
fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}
fn default_max_upload_mb() -> usize {
    100
}
