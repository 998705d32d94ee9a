//! Maps `CatalogError` onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use catalog_core::error::CatalogError;
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub struct AppError(pub CatalogError);

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        Self(e)
    }
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(CatalogError::Validation(msg.into()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_error_kind() {
        let resp = AppError(CatalogError::NotFound("movie 9".into())).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = AppError::bad_request("bad id").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = AppError(CatalogError::Storage(anyhow::anyhow!("down"))).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
