//! /api/movie: search with any valid token; create, update and delete need admin.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::Query;
use axum::{Extension, Json};
use catalog_core::error::CatalogError;
use catalog_core::principal::Principal;
use catalog_core::service::{CatalogService, MovieCreation};
use catalog_core::types::{Movie, MovieId, MovieOrder, MoviePayload, MovieView, NewMoviePayload};
use serde::Deserialize;

use super::{json_body, OkResponse};
use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MovieQuery {
    pub title: String,
    /// Actor name fragment. Takes precedence over `title` when non-empty.
    pub name: String,
    pub sort: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteMovieQuery {
    pub id: String,
}

pub async fn list(
    Extension(service): Extension<Arc<dyn CatalogService>>,
    Query(query): Query<MovieQuery>,
) -> Result<Json<Vec<MovieView>>, AppError> {
    let order = MovieOrder::from_sort_key(&query.sort);
    let views = if query.name.is_empty() {
        service.search_movies_by_title(&query.title, order).await?
    } else {
        service.search_movies_by_actor(&query.name, order).await?
    };
    Ok(Json(views))
}

pub async fn create(
    Extension(principal): Extension<Principal>,
    Extension(service): Extension<Arc<dyn CatalogService>>,
    body: Result<Json<NewMoviePayload>, JsonRejection>,
) -> Result<Json<MovieCreation>, AppError> {
    service.require_admin(&principal).await?;
    let created = service.create_movie(json_body(body)?).await?;
    Ok(Json(created))
}

pub async fn update(
    Extension(principal): Extension<Principal>,
    Extension(service): Extension<Arc<dyn CatalogService>>,
    body: Result<Json<MoviePayload>, JsonRejection>,
) -> Result<Json<Movie>, AppError> {
    service.require_admin(&principal).await?;
    let payload = json_body(body)?;
    if payload.id <= 0 {
        return Err(AppError::bad_request("ID must be a positive integer"));
    }
    let movie = service.update_movie(payload).await?;
    Ok(Json(movie))
}

pub async fn delete(
    Extension(principal): Extension<Principal>,
    Extension(service): Extension<Arc<dyn CatalogService>>,
    Query(query): Query<DeleteMovieQuery>,
) -> Result<Json<OkResponse>, AppError> {
    service.require_admin(&principal).await?;
    let id: MovieId = match query.id.parse() {
        Ok(id) if id > 0 => id,
        _ => return Err(AppError::bad_request(format!("invalid movie id '{}'", query.id))),
    };
    match service.delete_movie(id).await? {
        0 => Err(CatalogError::NotFound(format!("movie {id}")).into()),
        _ => Ok(Json(OkResponse {
            ok: format!("movie {id} deleted"),
        })),
    }
}
