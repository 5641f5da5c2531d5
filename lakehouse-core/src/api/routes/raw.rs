// lakehouse-core/src/api/routes/raw.rs

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde_json::{Value, json};

use crate::api::AppState;
use crate::api::error::ApiError;
use crate::application::RawFileInfo;

pub async fn list_files(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let files = state.bronze.list()?;
    Ok(Json(json!({
        "files": files,
        "max_upload_bytes": state.bronze.max_bytes(),
    })))
}

pub async fn read_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let content = state.bronze.read(&name)?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], content))
}

pub async fn write_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<RawFileInfo>), ApiError> {
    let info = state.bronze.write(&name, &body)?;
    Ok((StatusCode::CREATED, Json(info)))
}

pub async fn delete_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.bronze.delete(&name)?;
    Ok(StatusCode::NO_CONTENT)
}
