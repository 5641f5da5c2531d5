// lakehouse-core/src/api/routes/search.rs

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::api::AppState;
use crate::api::error::ApiError;
use crate::application::{IndexOutcome, IndexSettings, ensure_collection, index_projects, search_projects};
use crate::domain::search::{SearchQuery, SearchResponse};
use crate::ports::search::SearchEngine;

const DEFAULT_K: usize = 10;

fn engine(state: &AppState) -> Result<Arc<dyn SearchEngine>, ApiError> {
    state
        .services
        .search
        .clone()
        .ok_or_else(|| ApiError::Unavailable("search is disabled".to_string()))
}

pub async fn init(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let engine = engine(&state)?;
    let services = &state.services;
    let dimensions = services.embeddings.as_ref().and_then(|e| e.dimensions());
    let created = ensure_collection(engine.as_ref(), &services.config.search.collection, dimensions).await?;
    Ok(Json(json!({
        "collection": services.config.search.collection,
        "created": created,
    })))
}

pub async fn index(State(state): State<AppState>) -> Result<Json<IndexOutcome>, ApiError> {
    let engine = engine(&state)?;
    let services = &state.services;
    // Indexing reads the Gold zone, so it waits for any running pipeline
    let _guard = services.run_lock.lock().await;
    let settings = IndexSettings {
        gold_dir: &services.layout.gold,
        state_dir: &services.layout.state,
        collection: &services.config.search.collection,
        batch_size: services.config.search.batch_size,
    };
    let outcome = index_projects(engine.as_ref(), services.embeddings.as_deref(), &settings).await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub country: Option<String>,
    pub year: Option<i64>,
    pub k: Option<usize>,
    #[serde(default)]
    pub use_vector: bool,
}

pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::Validation(e.body_text()))?;
    let engine = engine(&state)?;
    let query = SearchQuery::new(
        &params.q,
        params.country.as_deref(),
        params.year,
        params.k.unwrap_or(DEFAULT_K),
    )?;
    let response = search_projects(
        engine.as_ref(),
        state.services.embeddings.as_deref(),
        query,
        params.use_vector,
    )
    .await?;
    Ok(Json(response))
}
