// lakehouse-core/src/api/auth.rs
//
// HTTP Basic authentication for every route except the banner and the health check.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

use crate::api::AppState;
use crate::api::error::ApiError;

/// `user:password` from an `Authorization: Basic ...` header.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

/// Compares fixed-size digests so the comparison time does not depend on the
/// length of the common prefix.
fn same_secret(given: &str, expected: &str) -> bool {
    let a = Sha256::digest(given.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub fn check(headers: &HeaderMap, user: Option<&str>, password: Option<&str>) -> Result<(), ApiError> {
    let (Some(user), Some(password)) = (user, password) else {
        return Err(ApiError::AuthNotConfigured);
    };
    let (given_user, given_password) = basic_credentials(headers).ok_or(ApiError::Unauthorized)?;
    let user_ok = same_secret(&given_user, user);
    let password_ok = same_secret(&given_password, password);
    if user_ok && password_ok {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

pub async fn require_basic_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let api = &state.services.config.api;
    check(request.headers(), api.username.as_deref(), api.password.as_deref())?;
    Ok(next.run(request).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_valid_credentials() {
        let encoded = STANDARD.encode("admin:s3cret");
        let result = check(&headers(&format!("Basic {}", encoded)), Some("admin"), Some("s3cret"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_password_may_contain_colons() {
        let encoded = STANDARD.encode("admin:a:b");
        assert_eq!(
            basic_credentials(&headers(&format!("basic {}", encoded))),
            Some(("admin".to_string(), "a:b".to_string()))
        );
    }

    #[test]
    fn test_wrong_or_missing_credentials() {
        let encoded = STANDARD.encode("admin:nope");
        assert!(matches!(
            check(&headers(&format!("Basic {}", encoded)), Some("admin"), Some("s3cret")),
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            check(&HeaderMap::new(), Some("admin"), Some("s3cret")),
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            check(&headers("Bearer token"), Some("admin"), Some("s3cret")),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn test_unconfigured_server() {
        assert!(matches!(
            check(&HeaderMap::new(), Some("admin"), None),
            Err(ApiError::AuthNotConfigured)
        ));
    }
}
