use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{auth_status, handle_oauth_callback, logout, refresh_session, start_oauth_flow};
use crate::handlers::{
    api_info, get_task, health_check, list_lists, list_spaces, list_tasks, process_request, update_task,
};
use crate::AppState;

/// Monta o router HTTP do agente
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(api_info))
        .route("/api", get(api_info))
        .route("/health", get(health_check))

        // OAuth2
        .route("/auth/clickup", get(start_oauth_flow))
        .route("/oauth/callback", get(handle_oauth_callback))
        .route("/auth/status", get(auth_status))
        .route("/auth/refresh", post(refresh_session))
        .route("/auth/logout", post(logout))

        // Agente e API do ClickUp
        .route("/process", post(process_request))
        .route("/spaces", get(list_spaces))
        .route("/spaces/:space_id/lists", get(list_lists))
        .route("/tasks/:list_id", get(list_tasks))
        .route("/task/:task_id", get(get_task).put(update_task))

        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
