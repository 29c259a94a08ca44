use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use axum::response::{IntoResponse, Response};
use subtle::ConstantTimeEq;

use crate::error::ApiError;
use crate::router::AppState;

/// Ensure the inbound request carries the admin key.
/// Accepts either:
/// - Header: `x-api-key: ...`
/// - Header: `Authorization: Bearer <key>`
///
/// An empty configured key rejects every request.
pub fn ensure_authorized(headers: &HeaderMap, expected: &str) -> Result<(), ApiError> {
    if expected.is_empty() {
        return Err(ApiError::Unauthorized);
    }

    // 1) header: x-api-key
    if let Some(hv) = headers.get("x-api-key").and_then(|v| v.to_str().ok())
        && bool::from(hv.as_bytes().ct_eq(expected.as_bytes()))
    {
        return Ok(());
    }

    // 2) header: Authorization: Bearer <key>
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        let auth = auth.trim();
        if let Some(token) = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            && bool::from(token.as_bytes().ct_eq(expected.as_bytes()))
        {
            return Ok(());
        }
    }

    Err(ApiError::Unauthorized)
}

#[derive(Debug, Clone, Copy)]
pub struct RequireAdminKey;

impl FromRequestParts<AppState> for RequireAdminKey {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        ensure_authorized(&parts.headers, &state.admin_key).map_err(|e| e.into_response())?;
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(name: &'static str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn accepts_api_key_header() {
        let headers = headers_with("x-api-key", "secret");
        assert!(ensure_authorized(&headers, "secret").is_ok());
    }

    #[test]
    fn accepts_bearer_token() {
        let headers = headers_with("authorization", "Bearer secret");
        assert!(ensure_authorized(&headers, "secret").is_ok());
    }

    #[test]
    fn rejects_wrong_key() {
        let headers = headers_with("x-api-key", "nope");
        assert!(ensure_authorized(&headers, "secret").is_err());
    }

    #[test]
    fn empty_configured_key_rejects_everything() {
        let headers = headers_with("x-api-key", "");
        assert!(ensure_authorized(&headers, "").is_err());
    }
}
