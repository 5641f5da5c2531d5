// lakehouse-core/src/error.rs

use crate::domain::error::DomainError;
use crate::domain::run::Stage;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum LakehouseError {
    // --- DOMAIN ERRORS (records, dependency graph, validation) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, parsing, engines) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- INPUT ERRORS ---
    #[error("Source file for '{entity}' is missing: {path}")]
    #[diagnostic(
        code(lakehouse::input::missing_source),
        help("Upload the file into the Bronze zone or disable `strict_inputs`.")
    )]
    MissingSource { entity: String, path: String },

    #[error("Raw file '{0}' not found")]
    #[diagnostic(code(lakehouse::input::not_found))]
    NotFound(String),

    #[error("Payload of {size} bytes exceeds the {limit} bytes limit")]
    #[diagnostic(code(lakehouse::input::too_large))]
    PayloadTooLarge { size: usize, limit: usize },

    // --- PIPELINE ---
    #[error("Pipeline run {run_id} failed during the {stage} stage: {source}")]
    #[diagnostic(code(lakehouse::pipeline::stage_failed))]
    StageFailed {
        stage: Stage,
        run_id: String,
        #[source]
        source: Box<LakehouseError>,
    },

    // --- GENERIC ---
    #[error("Internal Error: {0}")]
    InternalError(String),

    #[error("Unsafe path traversal detected: {0}")]
    UnsafePath(String),
}

impl LakehouseError {
    /// Stage that aborted the run, if this error came out of the pipeline.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            LakehouseError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

// Manual implementation to avoid a duplicate variant but keep `?` on std IO calls
impl From<std::io::Error> for LakehouseError {
    fn from(err: std::io::Error) -> Self {
        LakehouseError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<duckdb::Error> for LakehouseError {
    fn from(err: duckdb::Error) -> Self {
        LakehouseError::Infrastructure(err.into())
    }
}
