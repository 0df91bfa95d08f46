use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::time::Instant;

use crate::services::{Command, OpenAIService};
use crate::utils::logging::*;
use crate::utils::{split_task_reply, AppError, AppResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// POST /process
///
/// Interpreta o pedido com o LLM e executa o comando detectado no ClickUp.
/// Comandos que usam o ClickUp falham com 401 antes de chamar o LLM se a
/// sessão não estiver autenticada.
pub async fn process_request(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProcessRequest>,
) -> AppResult<Json<Value>> {
    let start_time = Instant::now();
    log_request_received("/process", "POST");

    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| {
            log_validation_error("message", "is required");
            AppError::ValidationError("Message is required".to_string())
        })?;

    let command = Command::detect(&message);
    log_info(&format!("🧭 Comando detectado: {:?}", command));

    if command.requires_clickup() && !state.session.is_authenticated().await {
        return Err(AppError::NotAuthenticated);
    }

    let response = match command {
        Command::CreateTask => create_task_from_message(&state, &message).await?,
        Command::ListSpaces => list_space_names(&state).await?,
        Command::Chat => {
            let reply = llm(&state)?.complete(&message).await?;
            json!({
                "message": "Request processed",
                "assistant_response": reply
            })
        }
    };

    let processing_time = start_time.elapsed().as_millis() as u64;
    log_request_processed("/process", 200, processing_time);

    Ok(Json(response))
}

fn llm(state: &AppState) -> AppResult<&OpenAIService> {
    state
        .llm
        .as_ref()
        .ok_or_else(|| AppError::LlmError("OPENAI_API_KEY não configurada".to_string()))
}

/// Cria a task na primeira lista do primeiro space
async fn create_task_from_message(state: &AppState, message: &str) -> AppResult<Value> {
    let reply = llm(state)?.complete(message).await?;

    let spaces = state
        .session
        .run(|client| async move { client.list_spaces().await })
        .await?;
    let space_id = first_id(&spaces, "spaces").ok_or_else(|| AppError::NotFound("No spaces found".to_string()))?;

    let lists = state
        .session
        .run(|client| async move { client.list_lists(&space_id).await })
        .await?;
    let list_id = first_id(&lists, "lists").ok_or_else(|| AppError::NotFound("No lists found".to_string()))?;

    let (name, description) = split_task_reply(&reply);
    if name.is_empty() {
        return Err(AppError::LlmError("Assistant reply has no task name".to_string()));
    }

    let task = state
        .session
        .run(|client| {
            let (list_id, name, description) = (list_id.clone(), name.clone(), description.clone());
            async move { client.create_task(&list_id, &name, &description, Map::new()).await }
        })
        .await?;

    let task_id = task.get("id").and_then(Value::as_str).unwrap_or_default();
    log_clickup_task_created(task_id, &name);

    Ok(json!({
        "message": "Task created successfully",
        "assistant_response": reply,
        "task": task
    }))
}

/// Lista os nomes dos spaces em formato de tópicos
async fn list_space_names(state: &AppState) -> AppResult<Value> {
    let spaces = state
        .session
        .run(|client| async move { client.list_spaces().await })
        .await?;

    let space_list = spaces
        .get("spaces")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|space| space.get("name").and_then(Value::as_str))
                .map(|name| format!("- {}", name))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();

    Ok(json!({
        "message": "Spaces retrieved successfully",
        "assistant_response": format!("Here are your ClickUp spaces:\n{}", space_list)
    }))
}

/// ID do primeiro item de `value[key]`, aceitando string ou número
fn first_id(value: &Value, key: &str) -> Option<String> {
    match value.get(key)?.as_array()?.first()?.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
