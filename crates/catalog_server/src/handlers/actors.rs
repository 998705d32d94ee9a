//! /api/actor: search with any valid token; create, update and delete need admin.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::Query;
use axum::{Extension, Json};
use catalog_core::error::CatalogError;
use catalog_core::principal::Principal;
use catalog_core::service::CatalogService;
use catalog_core::types::{Actor, ActorOrder, ActorPayload, ActorView};
use serde::Deserialize;

use super::{json_body, OkResponse};
use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActorQuery {
    pub name: String,
    pub sort: String,
}

pub async fn list(
    Extension(service): Extension<Arc<dyn CatalogService>>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<Vec<ActorView>>, AppError> {
    let views = service
        .search_actors(&query.name, ActorOrder::from_sort_key(&query.sort))
        .await?;
    Ok(Json(views))
}

pub async fn create(
    Extension(principal): Extension<Principal>,
    Extension(service): Extension<Arc<dyn CatalogService>>,
    body: Result<Json<ActorPayload>, JsonRejection>,
) -> Result<Json<Actor>, AppError> {
    service.require_admin(&principal).await?;
    let actor = service.create_actor(json_body(body)?).await?;
    Ok(Json(actor))
}

pub async fn update(
    Extension(principal): Extension<Principal>,
    Extension(service): Extension<Arc<dyn CatalogService>>,
    body: Result<Json<ActorPayload>, JsonRejection>,
) -> Result<Json<Actor>, AppError> {
    service.require_admin(&principal).await?;
    let payload = json_body(body)?;
    if payload.id <= 0 {
        return Err(AppError::bad_request("ID must be a positive integer"));
    }
    let actor = service.update_actor(payload).await?;
    Ok(Json(actor))
}

pub async fn delete(
    Extension(principal): Extension<Principal>,
    Extension(service): Extension<Arc<dyn CatalogService>>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<OkResponse>, AppError> {
    service.require_admin(&principal).await?;
    if query.name.is_empty() {
        return Err(AppError::bad_request("name is required"));
    }
    match service.delete_actor(&query.name).await? {
        0 => Err(CatalogError::NotFound(format!("actor '{}'", query.name)).into()),
        n => Ok(Json(OkResponse {
            ok: format!("deleted {n} actor(s)"),
        })),
    }
}
