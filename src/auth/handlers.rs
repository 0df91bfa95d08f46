//! OAuth2 HTTP Handlers
//!
//! Endpoints HTTP para iniciar e completar o fluxo OAuth2

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Json, Redirect},
};
use serde_json::{json, Value};
use std::sync::Arc;

use clickup_core::{CallbackParams, SessionStatus};

use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};
use crate::AppState;

/// GET /auth/clickup
///
/// Inicia o fluxo OAuth2 redirecionando o usuário (303) para a página de
/// autorização do ClickUp. Cada chamada gera um `state` novo.
pub async fn start_oauth_flow(State(state): State<Arc<AppState>>) -> Redirect {
    log_info("🚀 [OAuth2] Iniciando fluxo de autorização...");

    let auth_url = state.session.begin_authorization();

    log_info("↗️  [OAuth2] Redirecionando para a página de autorização do ClickUp");

    Redirect::to(&auth_url)
}

/// GET /oauth/callback?code=XXX&state=YYY
///
/// Recebe o callback OAuth2 do ClickUp e conclui a sessão. O token nunca é
/// exibido na página.
pub async fn handle_oauth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, Html<String>) {
    log_info("📥 [OAuth2] Callback recebido");

    match state.session.complete_authorization(&params).await {
        Ok(status) => {
            log_info("✅ [OAuth2] Sessão autenticada");
            (StatusCode::OK, render_success_page(&status))
        }
        Err(e) => {
            let error = AppError::from(e);
            log_error(&format!("❌ [OAuth2] Falha no callback: {}", error));
            (error.status_code(), render_error_page(&error.to_string()))
        }
    }
}

/// GET /auth/status
pub async fn auth_status(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    Json(state.session.status().await)
}

/// POST /auth/refresh
///
/// Renova o access token com o refresh token salvo. Sem refresh token
/// responde 401 e o usuário precisa refazer o fluxo em /auth/clickup.
pub async fn refresh_session(State(state): State<Arc<AppState>>) -> AppResult<Json<SessionStatus>> {
    log_request_received("/auth/refresh", "POST");
    let status = state.session.refresh().await?;
    log_info("🔄 [OAuth2] Sessão renovada");
    Ok(Json(status))
}

/// POST /auth/logout
pub async fn logout(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    log_request_received("/auth/logout", "POST");
    state.session.logout().await?;

    Ok(Json(json!({
        "message": "Logout realizado",
        "authenticated": false
    })))
}

/// Escapa texto vindo do provedor antes de inserir no HTML
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Renderizar página de sucesso
fn render_success_page(status: &SessionStatus) -> Html<String> {
    let workspace = status
        .workspace_id
        .as_deref()
        .map(|id| format!("<p><strong>Workspace:</strong> {}</p>", escape_html(id)))
        .unwrap_or_default();

    Html(format!(
        r#"
        <!DOCTYPE html>
        <html>
        <head>
            <title>ClickUp OAuth - Sucesso</title>
            <meta charset="UTF-8">
            <style>
                body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Arial, sans-serif;
                       max-width: 700px; margin: 50px auto; padding: 20px; background: #f5f5f5; }}
                .container {{ background: white; padding: 30px; border-radius: 12px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }}
                .success {{ background: #d4edda; border: 2px solid #28a745; padding: 20px; border-radius: 8px; }}
                h1 {{ color: #28a745; margin-top: 0; }}
                .footer {{ text-align: center; margin-top: 30px; color: #666; font-size: 12px; }}
            </style>
        </head>
        <body>
            <div class="container">
                <div class="success">
                    <h1>✅ Autorização OAuth2 Concluída!</h1>
                    <p>O acesso ao ClickUp foi verificado e salvo.</p>
                    {}
                </div>
                <div class="footer">
                    <p>Você pode fechar esta janela.</p>
                </div>
            </div>
        </body>
        </html>
        "#,
        workspace
    ))
}

/// Renderizar página de erro
fn render_error_page(error: &str) -> Html<String> {
    Html(format!(
        r#"
        <!DOCTYPE html>
        <html>
        <head>
            <title>ClickUp OAuth - Erro</title>
            <meta charset="UTF-8">
            <style>
                body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Arial, sans-serif;
                       max-width: 600px; margin: 50px auto; padding: 20px; background: #f5f5f5; }}
                .container {{ background: white; padding: 30px; border-radius: 12px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }}
                .error {{ background: #f8d7da; border: 2px solid #dc3545; padding: 20px; border-radius: 8px; }}
                h1 {{ color: #721c24; margin-top: 0; }}
                a {{ color: #007bff; text-decoration: none; font-weight: bold; }}
                a:hover {{ text-decoration: underline; }}
            </style>
        </head>
        <body>
            <div class="container">
                <div class="error">
                    <h1>❌ Erro na Autorização</h1>
                    <p><strong>Erro:</strong> {}</p>
                    <p><a href="/auth/clickup">← Tentar novamente</a></p>
                </div>
            </div>
        </body>
        </html>
        "#,
        escape_html(error)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>\"x\" & y</script>"), "&lt;script&gt;&quot;x&quot; &amp; y&lt;/script&gt;");
    }

    #[test]
    fn test_success_page_shows_workspace() {
        let page = render_success_page(&SessionStatus {
            authenticated: true,
            workspace_id: Some("9001".to_string()),
        });
        assert!(page.0.contains("Workspace:</strong> 9001"));
    }
}
