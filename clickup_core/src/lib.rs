//! # clickup_core
//!
//! Ciclo de vida do token OAuth2 do ClickUp e cliente autenticado da API v2.
//!
//! ## Componentes
//!
//! - [`TokenStore`]: persistência atômica do par access/refresh token
//! - [`OAuthFlow`]: URL de autorização, troca de código e refresh
//! - [`WorkspaceClient`]: chamadas autenticadas com erros normalizados
//! - [`SessionManager`]: sessão única do processo (autenticada ou não)
//!
//! ## Exemplo
//!
//! ```no_run
//! use clickup_core::{ApiConfig, OAuthConfig, OAuthFlow, SessionManager};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let oauth = OAuthFlow::new(OAuthConfig::from_env()?)?;
//!     let session = SessionManager::new(oauth, ApiConfig::from_env()?);
//!
//!     if !session.restore().await {
//!         println!("Autorize em: {}", session.begin_authorization());
//!     }
//!     Ok(())
//! }
//! ```

/// Módulo de autenticação OAuth2
pub mod auth;

/// Módulo de cliente API
pub mod client;

/// Módulo de configuração
pub mod config;

/// Módulo de tratamento de erros
pub mod error;

pub mod session;

// Re-exportações para conveniência
pub use auth::{mask_secret, validate_callback, CallbackParams, Credential, OAuthFlow, StateStore, TokenStore};
pub use client::WorkspaceClient;
pub use config::{ApiConfig, OAuthConfig};
pub use error::{
    ApiError, ApiResult, ConfigError, OAuthError, OAuthResult, SessionError, SessionResult, StorageError,
};
pub use session::{SessionManager, SessionState, SessionStatus};
