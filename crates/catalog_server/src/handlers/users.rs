//! POST /api/create/user and GET|POST /api/login.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::{Extension, Json};
use catalog_core::service::CatalogService;
use catalog_core::types::Credentials;

use super::{json_body, TokenResponse};
use crate::error::AppError;

pub async fn register(
    Extension(service): Extension<Arc<dyn CatalogService>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let bearer = service.register_user(json_body(body)?).await?;
    Ok(Json(TokenResponse { bearer }))
}

pub async fn login(
    Extension(service): Extension<Arc<dyn CatalogService>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let bearer = service.login(json_body(body)?).await?;
    Ok(Json(TokenResponse { bearer }))
}
