//! HTTP handlers for the task resource.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::info;

use super::error::ApiError;
use super::state::AppState;
use crate::task::Task;
use crate::validation::{validate_create, validate_update, TaskPayload};

/// Unknown or non-numeric ids are reported the same way as missing records.
fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound(raw.to_string()))
}

/// Turn the extracted body into the allow-listed payload.
fn payload(body: Result<Json<Value>, JsonRejection>) -> Result<TaskPayload, ApiError> {
    let Json(value) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    if !value.is_object() {
        return Err(ApiError::BadRequest("The request body must be a JSON object.".into()));
    }
    serde_json::from_value(value).map_err(|e| ApiError::BadRequest(e.to_string()))
}

pub async fn health() -> &'static str {
    "OK"
}

/// `GET /tasks`
pub async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    Json(state.store.list().await)
}

/// `POST /tasks`
pub async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let fields = validate_create(&payload(body)?)?;
    let task = state.store.create(fields).await?;
    info!(id = task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// `GET /tasks/{id}`
pub async fn show_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let task_id = parse_id(&id)?;
    state.store.get(task_id).await.map(Json).ok_or(ApiError::NotFound(id))
}

/// `PUT /tasks/{id}`
///
/// The id is resolved before the body is validated, so an unknown id is a 404
/// even when the body is also invalid.
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let task_id = parse_id(&id)?;
    if state.store.get(task_id).await.is_none() {
        return Err(ApiError::NotFound(id));
    }
    let changes = validate_update(&payload(body)?)?;
    let task = state.store.update(task_id, changes).await?.ok_or(ApiError::NotFound(id))?;
    info!(id = task.id, completed = task.completed, "task updated");
    Ok(Json(task))
}

/// `DELETE /tasks/{id}`
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let task_id = parse_id(&id)?;
    state.store.delete(task_id).await?.ok_or(ApiError::NotFound(id))?;
    info!(id = task_id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}
