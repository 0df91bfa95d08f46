use axum::{
    extract::{Path, State},
    response::Json,
};
use clickup_core::SessionError;
use serde_json::Value;
use std::sync::Arc;

use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};
use crate::AppState;

/// GET /spaces
pub async fn list_spaces(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    log_request_received("/spaces", "GET");

    let spaces = state
        .session
        .run(|client| async move { client.list_spaces().await })
        .await
        .map_err(|e| api_failure("/spaces", e))?;

    Ok(Json(spaces))
}

/// GET /spaces/:space_id/lists
pub async fn list_lists(
    State(state): State<Arc<AppState>>,
    Path(space_id): Path<String>,
) -> AppResult<Json<Value>> {
    log_request_received("/spaces/:space_id/lists", "GET");

    let lists = state
        .session
        .run(|client| async move { client.list_lists(&space_id).await })
        .await
        .map_err(|e| api_failure("/spaces/:space_id/lists", e))?;

    Ok(Json(lists))
}

/// GET /tasks/:list_id
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<String>,
) -> AppResult<Json<Value>> {
    log_request_received("/tasks/:list_id", "GET");

    let tasks = state
        .session
        .run(|client| async move { client.list_tasks(&list_id).await })
        .await
        .map_err(|e| api_failure("/tasks/:list_id", e))?;

    Ok(Json(tasks))
}

/// GET /task/:task_id
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> AppResult<Json<Value>> {
    log_request_received("/task/:task_id", "GET");

    let task = state
        .session
        .run(|client| async move { client.get_task(&task_id).await })
        .await
        .map_err(|e| api_failure("/task/:task_id", e))?;

    Ok(Json(task))
}

/// PUT /task/:task_id
///
/// O corpo é repassado ao ClickUp como está (precisa ser um objeto JSON).
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
    Json(fields): Json<Value>,
) -> AppResult<Json<Value>> {
    log_request_received("/task/:task_id", "PUT");

    if !fields.is_object() {
        log_validation_error("body", "must be a JSON object");
        return Err(AppError::ValidationError("Request body must be a JSON object".to_string()));
    }

    let task = state
        .session
        .run(|client| async move { client.update_task(&task_id, &fields).await })
        .await
        .map_err(|e| api_failure("/task/:task_id", e))?;

    log_info(&format!("✏️ ClickUp task updated: {}", task.get("id").and_then(Value::as_str).unwrap_or("?")));
    Ok(Json(task))
}

/// Registra falhas da API do ClickUp antes de converter para resposta HTTP
fn api_failure(endpoint: &str, err: SessionError) -> AppError {
    if let SessionError::Api(api) = &err {
        log_clickup_api_error(endpoint, api.status(), api.message());
    }
    err.into()
}
