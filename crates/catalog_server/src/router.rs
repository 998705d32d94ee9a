//! Router construction for the catalog server.

use std::sync::Arc;

use axum::{
    middleware as axum_mw,
    routing::{get, post},
    Extension, Router,
};
use catalog_core::service::CatalogService;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::jwt::jwt_auth;

/// Build the full axum router with all routes and middleware.
pub fn build_router(service: Arc<dyn CatalogService>) -> Router {
    // Any valid token; admin-only methods check the role inside the handler
    let protected = Router::new()
        .route(
            "/api/actor",
            get(handlers::actors::list)
                .post(handlers::actors::create)
                .patch(handlers::actors::update)
                .put(handlers::actors::update)
                .delete(handlers::actors::delete),
        )
        .route(
            "/api/movie",
            get(handlers::movies::list)
                .post(handlers::movies::create)
                .patch(handlers::movies::update)
                .put(handlers::movies::update)
                .delete(handlers::movies::delete),
        )
        .layer(axum_mw::from_fn(jwt_auth));

    let public = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/create/user", post(handlers::users::register))
        .route(
            "/api/login",
            get(handlers::users::login).post(handlers::users::login),
        );

    public
        .merge(protected)
        .layer(Extension(service))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
