//! # Endpoints OAuth2 do ClickUp
//!
//! O fluxo em si (state, troca de código, persistência do token) vive em
//! `clickup_core::SessionManager`; aqui ficam só os handlers HTTP.
//!
//! - `GET /auth/clickup`: redireciona para a autorização do ClickUp
//! - `GET /oauth/callback`: conclui o fluxo e exibe uma página HTML
//! - `GET /auth/status`, `POST /auth/refresh` e `POST /auth/logout`

pub mod handlers;

pub use handlers::{auth_status, handle_oauth_callback, logout, refresh_session, start_oauth_flow};
