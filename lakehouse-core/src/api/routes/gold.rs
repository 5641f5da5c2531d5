// lakehouse-core/src/api/routes/gold.rs

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::api::AppState;
use crate::api::error::ApiError;
use crate::application::{gold_facts, gold_projects, project_filter};
use crate::ports::warehouse::{FactRow, ProjectFilter, ProjectRow};

#[derive(Debug, Deserialize)]
pub struct GoldParams {
    pub country: Option<String>,
    pub year: Option<i64>,
    pub limit: Option<usize>,
}

fn filter(params: Result<Query<GoldParams>, QueryRejection>) -> Result<ProjectFilter, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::Validation(e.body_text()))?;
    Ok(project_filter(
        params.country.as_deref(),
        params.year,
        params.limit,
    )?)
}

pub async fn projects(
    State(state): State<AppState>,
    params: Result<Query<GoldParams>, QueryRejection>,
) -> Result<Json<Vec<ProjectRow>>, ApiError> {
    let filter = filter(params)?;
    Ok(Json(gold_projects(state.services.warehouse.as_ref(), &filter).await?))
}

pub async fn facts(
    State(state): State<AppState>,
    params: Result<Query<GoldParams>, QueryRejection>,
) -> Result<Json<Vec<FactRow>>, ApiError> {
    let filter = filter(params)?;
    Ok(Json(gold_facts(state.services.warehouse.as_ref(), &filter).await?))
}
