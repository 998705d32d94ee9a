pub mod actors;
pub mod health;
pub mod movies;
pub mod users;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::Serialize;

use crate::error::AppError;

/// Unwrap a JSON body, answering malformed input with 400 instead of axum's default rejection.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(v)| v)
        .map_err(|e| AppError::bad_request(format!("invalid json: {}", e.body_text())))
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub bearer: String,
}
