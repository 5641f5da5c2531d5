// lakehouse-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("DuckDB Engine Error: {0}")]
    #[diagnostic(
        code(lakehouse::infra::database::duckdb),
        help("An error occurred inside the warehouse SQL engine.")
    )]
    DuckDB(#[from] duckdb::Error),

    #[error("DataFusion Engine Error: {0}")]
    #[diagnostic(code(lakehouse::infra::database::datafusion))]
    DataFusion(#[from] datafusion::error::DataFusionError),

    #[error("Warehouse load of table '{table}' failed: {reason}")]
    #[diagnostic(
        code(lakehouse::infra::database::load),
        help("The transaction was rolled back; the previous warehouse content is intact.")
    )]
    LoadFailed { table: String, reason: String },
}

/// Search engine failures, split by the operation that failed.
#[derive(Error, Debug, Diagnostic)]
pub enum SearchError {
    #[error("Connection error: {0}")]
    #[diagnostic(
        code(lakehouse::infra::search::connection),
        help("Is the search engine reachable at the configured URL?")
    )]
    ConnectionError(String),

    #[error("Collection error: {0}")]
    #[diagnostic(code(lakehouse::infra::search::collection))]
    CollectionError(String),

    #[error("Bulk index error: {0}")]
    #[diagnostic(code(lakehouse::infra::search::bulk_index))]
    BulkIndexError(String),

    #[error("Query error: {0}")]
    #[diagnostic(code(lakehouse::infra::search::query))]
    QueryError(String),

    #[error("Parse error: {0}")]
    #[diagnostic(code(lakehouse::infra::search::parse))]
    ParseError(String),

    #[error("Embedding provider error: {0}")]
    #[diagnostic(code(lakehouse::infra::search::embeddings))]
    EmbeddingError(String),
}

impl SearchError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    pub fn collection(msg: impl Into<String>) -> Self {
        Self::CollectionError(msg.into())
    }

    pub fn bulk_index(msg: impl Into<String>) -> Self {
        Self::BulkIndexError(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::EmbeddingError(msg.into())
    }
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- DATABASE (Abstracted) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DatabaseError),

    // --- SEARCH ENGINE ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Search(#[from] SearchError),

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(lakehouse::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- BRONZE CSV ---
    #[error("CSV Error in {file}: {source}")]
    #[diagnostic(
        code(lakehouse::infra::csv),
        help("The Bronze file could not be read as delimited text.")
    )]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    // --- COLUMNAR FILES ---
    #[error("Parquet Error: {0}")]
    #[diagnostic(code(lakehouse::infra::parquet))]
    Parquet(#[from] datafusion::parquet::errors::ParquetError),

    #[error("Arrow Error: {0}")]
    #[diagnostic(code(lakehouse::infra::arrow))]
    Arrow(#[from] datafusion::arrow::error::ArrowError),

    // --- CONFIG / YAML / JSON ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(lakehouse::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON Error: {0}")]
    #[diagnostic(code(lakehouse::infra::json))]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(lakehouse::infra::config))]
    ConfigError(String),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(code(lakehouse::infra::config_missing))]
    ConfigNotFound(String),
}

// Manual implementation for shortcuts (e.g. `?` operator on duckdb calls)
impl From<duckdb::Error> for InfrastructureError {
    fn from(err: duckdb::Error) -> Self {
        InfrastructureError::Database(DatabaseError::DuckDB(err))
    }
}

impl From<datafusion::error::DataFusionError> for InfrastructureError {
    fn from(err: datafusion::error::DataFusionError) -> Self {
        InfrastructureError::Database(DatabaseError::DataFusion(err))
    }
}
