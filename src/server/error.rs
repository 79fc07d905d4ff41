//! API error type and its HTTP rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::db::DbError;
use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("Task {0} not found.")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Store(#[from] DbError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Validation(errors) => {
                tracing::warn!(%errors, "validation failed");
                (status, Json(errors.to_body())).into_response()
            }
            ApiError::Store(e) => {
                tracing::error!(error = %e, "store write failed");
                (status, Json(json!({ "message": "Server Error" }))).into_response()
            }
            other => {
                tracing::warn!(status = status.as_u16(), "{other}");
                (status, Json(json!({ "message": other.to_string() }))).into_response()
            }
        }
    }
}
