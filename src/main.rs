/// Main Application: agente de tarefas ClickUp
///
/// Arquitetura:
/// - OAuth2 com o ClickUp (/auth/clickup -> /oauth/callback)
/// - Token persistido em arquivo e restaurado no boot
/// - OpenAI interpreta pedidos em linguagem natural (/process)
/// - Chamadas à API v2 do ClickUp passam pela sessão autenticada

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use clickup_agent::{config::Settings, routes, services::OpenAIService, utils::logging::*, AppState};
use clickup_core::{OAuthFlow, SessionManager};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Carregar variáveis de ambiente do .env (se existir)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::new()?;
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
    log_config_loaded(&run_mode);

    let oauth = OAuthFlow::new(settings.oauth_config()?)?;
    log_secret_loaded("CLICKUP_CLIENT_SECRET", &settings.clickup.client_secret);

    let session = Arc::new(SessionManager::new(oauth, settings.api_config()));
    if session.restore().await {
        log_info("✅ Sessão ClickUp restaurada do token salvo");
    } else {
        log_warning("⚠️  Nenhuma sessão ClickUp ativa. Autorize em /auth/clickup");
    }

    let llm = OpenAIService::new(&settings.openai);

    let host = settings.server.host.clone();
    let port = settings.server.port;

    let app_state = Arc::new(AppState {
        settings,
        session,
        llm,
    });

    let app = routes::router(app_state);

    let listener = TcpListener::bind(format!("{}:{}", host, port)).await?;

    log_server_startup(port);
    log_server_ready(port);

    // Graceful shutdown com signal handling
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log_info("🛑 Server shut down gracefully");
    Ok(())
}

/// Signal handler para graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log_error(&format!("Falha ao instalar handler de Ctrl+C: {}", e));
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log_error(&format!("Falha ao instalar handler de SIGTERM: {}", e));
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log_info("🛑 Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            log_info("🛑 Received SIGTERM, shutting down gracefully...");
        }
    }
}
