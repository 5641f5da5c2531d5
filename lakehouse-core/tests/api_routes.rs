// lakehouse-core/tests/api_routes.rs
//
// End-to-end HTTP tests: raw upload -> pipeline run -> warehouse and search queries.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lakehouse_core::api::{AppState, router};
use lakehouse_core::application::LakehouseServices;
use lakehouse_core::domain::project::LakehouseConfig;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const CONFIG: &str = r#"
name: api-test
warehouse:
  path: ":memory:"
search:
  backend: memory
api:
  username: admin
  password: s3cret
  max-upload-mb: 1
"#;

const PROJECTS: &str = "id;acronym;title;startDate;endDate;totalCost;objective\n\
    101;SUN;Solar storage;2022-01-01;2024-12-31;1000;Batteries for solar farms\n\
    102;WIND;Offshore wind;2021-03-01;2023-02-28;500;Floating turbines\n";
const ORGS: &str = "projectID;organisationID;name;country;role;ecContribution\n\
    101;9001;Fraunhofer;DE;coordinator;700\n\
    101;9002;CNRS;FR;participant;300\n\
    102;9003;Orsted;DK;coordinator;500\n";

fn app_with(config: &str) -> (TempDir, axum::Router) {
    let dir = tempfile::tempdir().unwrap();
    let config: LakehouseConfig = serde_yaml::from_str(config).unwrap();
    let services = LakehouseServices::from_config(dir.path(), config).unwrap();
    let app = router(AppState::new(Arc::new(services)));
    (dir, app)
}

fn app() -> (TempDir, axum::Router) {
    app_with(CONFIG)
}

fn auth() -> String {
    format!("Basic {}", STANDARD.encode("admin:s3cret"))
}

fn request(method: &str, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, auth())
        .body(body.into())
        .unwrap()
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 10_000_000).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, req).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_health_is_public() {
    let (_dir, app) = app();
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, json) = send_json(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
}

#[tokio::test]
async fn test_protected_routes_require_credentials() {
    let (_dir, app) = app();

    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/raw").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

    let wrong = Request::builder()
        .uri("/raw")
        .header(header::AUTHORIZATION, format!("Basic {}", STANDARD.encode("admin:guess")))
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, wrong).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_auth_configuration_is_a_server_error() {
    let (_dir, app) = app_with("name: open\nwarehouse:\n  path: \":memory:\"\nsearch:\n  backend: memory\n");

    let (status, json) = send_json(&app, request("GET", "/raw", Body::empty())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("not configured"));
}

#[tokio::test]
async fn test_raw_file_lifecycle() {
    let (_dir, app) = app();

    let (status, json) = send_json(&app, request("PUT", "/raw/project.csv", PROJECTS)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["path"], "project.csv");

    let (status, json) = send_json(&app, request("GET", "/raw", Body::empty())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["files"][0]["path"], "project.csv");
    assert_eq!(json["max_upload_bytes"], 1024 * 1024);

    let (status, body) = send(&app, request("GET", "/raw/project.csv", Body::empty())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, PROJECTS.as_bytes());

    let (status, _) = send(&app, request("DELETE", "/raw/project.csv", Body::empty())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, request("GET", "/raw/project.csv", Body::empty())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_raw_upload_rejections() {
    let (dir, app) = app();

    let (status, _) = send(&app, request("PUT", "/raw/..%2Fescape.csv", "x")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!dir.path().join("lake/escape.csv").exists());

    let (status, _) = send(&app, request("PUT", "/raw/notes.txt", "x")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let oversized = vec![b'a'; 1024 * 1024 + 1];
    let (status, _) = send(&app, request("PUT", "/raw/project.csv", oversized)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_pipeline_then_queries() {
    let (_dir, app) = app();
    send(&app, request("PUT", "/raw/project.csv", PROJECTS)).await;
    send(&app, request("PUT", "/raw/organization.csv", ORGS)).await;

    let run = Request::builder()
        .method("POST")
        .uri("/pipeline/run")
        .header(header::AUTHORIZATION, auth())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"mode": "full"}"#))
        .unwrap();
    let (status, report) = send_json(&app, run).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["success"], true);
    assert_eq!(report["indexed_documents"], 2);

    let (status, last) = send_json(&app, request("GET", "/pipeline/last", Body::empty())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(last["run_id"], report["run_id"]);

    // Country matches participating organizations, case-insensitively
    let (status, rows) = send_json(&app, request("GET", "/gold/projects?country=fr", Body::empty())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["project_id"], "101");
    assert_eq!(rows[0]["organizations"], 2);

    let (status, facts) = send_json(&app, request("GET", "/gold/facts?year=2021", Body::empty())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(facts[0]["organisation_id"], "9003");

    let (status, hits) = send_json(&app, request("GET", "/search?q=solar&k=5", Body::empty())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits["found"], 1);
    assert_eq!(hits["hits"][0]["document"]["project_id"], "101");
}

#[tokio::test]
async fn test_invalid_parameters_are_unprocessable() {
    let (_dir, app) = app();

    for uri in [
        "/gold/projects?limit=0",
        "/gold/projects?year=abc",
        "/gold/facts?country=FRA",
        "/search?q=x&k=0",
        "/search?q=x&k=201",
    ] {
        let (status, json) = send_json(&app, request("GET", uri, Body::empty())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
        assert!(json["error"].is_string());
    }
}

#[tokio::test]
async fn test_last_run_before_any_run() {
    let (_dir, app) = app();
    let (status, _) = send(&app, request("GET", "/pipeline/last", Body::empty())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
