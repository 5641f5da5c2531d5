// lakehouse-core/src/api/mod.rs
//
// axum surface over the application layer.

pub mod auth;
pub mod error;
mod routes;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::application::{BronzeStore, LakehouseServices};
use crate::error::LakehouseError;

#[derive(Clone)]
pub struct AppState {
    pub services: Arc<LakehouseServices>,
    pub bronze: Arc<BronzeStore>,
}

impl AppState {
    pub fn new(services: Arc<LakehouseServices>) -> Self {
        let bronze = BronzeStore::new(
            services.layout.bronze.clone(),
            services.config.api.max_upload_bytes(),
        );
        Self {
            services,
            bronze: Arc::new(bronze),
        }
    }
}

async fn banner() -> Json<Value> {
    Json(json!({
        "service": "cordis-lakehouse",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

pub fn router(state: AppState) -> Router {
    let max_body = state.bronze.max_bytes();

    let protected = Router::new()
        .route("/raw", get(routes::raw::list_files))
        .route(
            "/raw/{name}",
            get(routes::raw::read_file)
                .put(routes::raw::write_file)
                .delete(routes::raw::delete_file),
        )
        .route("/pipeline/run", post(routes::pipeline::run))
        .route("/pipeline/last", get(routes::pipeline::last))
        .route("/gold/projects", get(routes::gold::projects))
        .route("/gold/facts", get(routes::gold::facts))
        .route("/search/init", post(routes::search::init))
        .route("/search/index", post(routes::search::index))
        .route("/search", get(routes::search::search))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ));

    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .merge(protected)
        // Oversized uploads reach the store, which answers 413 itself
        .layer(DefaultBodyLimit::max(max_body.saturating_add(1)))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState, bind: &str) -> Result<(), LakehouseError> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(address = bind, "API listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
