use axum::{extract::State, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::utils::logging::*;
use crate::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    log_health_check();

    Json(json!({
        "status": "healthy",
        "service": "clickup-agent",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "authenticated": state.session.is_authenticated().await,
        "llm_model": state.llm.as_ref().map(|llm| llm.model())
    }))
}

/// GET / e GET /api
pub async fn api_info() -> Json<Value> {
    Json(json!({
        "message": "OpenAI ClickUp Agent API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/health": "GET - Service liveness and authentication state",
            "/auth/clickup": "GET - Start the ClickUp OAuth2 authorization flow",
            "/oauth/callback": "GET - OAuth2 redirect target",
            "/auth/status": "GET - Current session status",
            "/auth/refresh": "POST - Renew the session with the stored refresh token",
            "/auth/logout": "POST - Forget the stored ClickUp token",
            "/process": "POST - Process natural language requests for task management",
            "/spaces": "GET - List all available ClickUp spaces",
            "/spaces/{space_id}/lists": "GET - List all lists in a space",
            "/tasks/{list_id}": "GET - List all tasks in a specific list",
            "/task/{task_id}": "GET/PUT - Get or update a task"
        }
    }))
}
