//! Bearer-token authentication middleware.
//!
//! Accepts `Authorization: Bearer <token>` or a bare `Bearer: <token>` header.
//! On success the caller's `Principal` is inserted as a request extension for
//! the handlers; otherwise the request is answered with 401.

use std::sync::Arc;

use axum::extract::{Extension, Request};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use catalog_core::error::CatalogError;
use catalog_core::service::CatalogService;
use tracing::debug;

use crate::error::AppError;

pub const BARE_BEARER_HEADER: &str = "bearer";

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let from_authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token);
    from_authorization
        .or_else(|| {
            headers
                .get(BARE_BEARER_HEADER)
                .and_then(|v| v.to_str().ok())
        })
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub async fn jwt_auth(
    Extension(service): Extension<Arc<dyn CatalogService>>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(req.headers()) else {
        return AppError(CatalogError::Unauthenticated("missing bearer token".into()))
            .into_response();
    };
    match service.authenticate(token).await {
        Ok(principal) => {
            debug!(login = %principal.login, "authenticated");
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => AppError(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn reads_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));
    }

    #[test]
    fn authorization_scheme_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("BEARER  def "));
        assert_eq!(bearer_token(&headers), Some("def"));
    }

    #[test]
    fn reads_bare_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(BARE_BEARER_HEADER, HeaderValue::from_static("xyz"));
        assert_eq!(bearer_token(&headers), Some("xyz"));
    }

    #[test]
    fn ignores_other_schemes_and_blank_values() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
        headers.insert(BARE_BEARER_HEADER, HeaderValue::from_static("  "));
        assert_eq!(bearer_token(&headers), None);
    }
}
