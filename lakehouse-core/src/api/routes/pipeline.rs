// lakehouse-core/src/api/routes/pipeline.rs

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;
use tracing::warn;

use crate::api::AppState;
use crate::api::error::ApiError;
use crate::application::{last_run, run_pipeline};
use crate::domain::entity::SourceEntity;
use crate::domain::run::{RunContext, RunReport};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Full,
    Selective,
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub mode: RunMode,
    #[serde(default)]
    pub changed: Vec<String>,
    /// Defaults to indexing whenever search is enabled.
    pub index: Option<bool>,
}

pub async fn run(
    State(state): State<AppState>,
    request: Result<Json<RunRequest>, JsonRejection>,
) -> Result<Json<RunReport>, ApiError> {
    let Json(request) = request.map_err(|e| ApiError::Validation(e.body_text()))?;
    let services = &state.services;
    let strict = services.config.strict_inputs;

    let ctx = match request.mode {
        RunMode::Full => RunContext::full(strict),
        RunMode::Selective => {
            let entities = request.changed.iter().filter_map(|name| {
                let entity = SourceEntity::parse(name);
                if entity.is_none() {
                    warn!(file = %name, "Unknown entity in selective run ignored");
                }
                entity
            });
            RunContext::selective(entities, strict)
        }
    };
    let index = request.index.unwrap_or(services.search.is_some());

    let report = run_pipeline(services, ctx, index).await?;
    Ok(Json(report))
}

pub async fn last(State(state): State<AppState>) -> Result<Json<RunReport>, ApiError> {
    last_run(&state.services.layout)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no pipeline run recorded yet".to_string()))
}
