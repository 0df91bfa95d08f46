// Biblioteca do agente ClickUp
// Expõe módulos para uso em testes e no binário

pub mod auth;
pub mod config;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use clickup_core::SessionManager;

// AppState é definido aqui para ser compartilhado
#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub session: Arc<SessionManager>,
    pub llm: Option<services::OpenAIService>,
}
