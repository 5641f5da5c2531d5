// lakehouse-core/src/api/error.rs

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::domain::error::DomainError;
use crate::error::LakehouseError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid credentials")]
    Unauthorized,

    #[error("authentication is not configured on the server")]
    AuthNotConfigured,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::AuthNotConfigured | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<LakehouseError> for ApiError {
    fn from(err: LakehouseError) -> Self {
        match err {
            LakehouseError::Domain(
                e @ (DomainError::InvalidQuery(_) | DomainError::InvalidFileName(_)),
            ) => ApiError::Validation(e.to_string()),
            e @ LakehouseError::NotFound(_) => ApiError::NotFound(e.to_string()),
            e @ LakehouseError::PayloadTooLarge { .. } => ApiError::PayloadTooLarge(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::from(LakehouseError::Domain(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        }
        let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();
        if matches!(self, ApiError::Unauthorized) {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"lakehouse\""),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let invalid = ApiError::from(LakehouseError::Domain(DomainError::InvalidQuery("k".into())));
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let missing = ApiError::from(LakehouseError::NotFound("project.csv".into()));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let large = ApiError::from(LakehouseError::PayloadTooLarge { size: 2, limit: 1 });
        assert_eq!(large.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let internal = ApiError::from(LakehouseError::InternalError("boom".into()));
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unauthorized_carries_challenge() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }
}
