use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::token::{mask_secret, Credential};
use crate::config::env::DEFAULT_TIMEOUT_SECS;
use crate::config::OAuthConfig;
use crate::error::{ConfigError, OAuthError, OAuthResult};

/// Resposta do endpoint de token do ClickUp
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// Fluxo OAuth2 authorization-code contra o ClickUp
///
/// Monta a URL de autorização e troca o código (ou um refresh token) por
/// uma [`Credential`]. Nunca registra client secret nem tokens em claro.
#[derive(Debug, Clone)]
pub struct OAuthFlow {
    config: OAuthConfig,
    http_client: Client,
}

impl OAuthFlow {
    pub fn new(config: OAuthConfig) -> Result<Self, ConfigError> {
        Self::with_timeout(config, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(config: OAuthConfig, timeout: Duration) -> Result<Self, ConfigError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| ConfigError::invalid(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http_client })
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Gera a URL de autorização do ClickUp
    ///
    /// Os scopes são unidos por vírgula e codificados como um único parâmetro.
    pub fn authorization_url(&self, state: &str) -> String {
        let scope = self.config.scopes.join(",");
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            self.config.auth_url,
            urlencoding::encode(self.config.client_id.as_str()),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(state)
        )
    }

    /// Troca o authorization code por access token
    ///
    /// A `redirect_uri` enviada é a mesma usada na URL de autorização; o
    /// provedor rejeita a troca se forem diferentes.
    pub async fn exchange_code_for_token(&self, code: &str) -> OAuthResult<Credential> {
        tracing::info!(
            "🔐 [OAuth2] Trocando authorization code por access token (client_id: {}, code: {})",
            self.config.client_id.as_str(),
            mask_secret(code)
        );

        let body = json!({
            "client_id": self.config.client_id.as_str(),
            "client_secret": self.config.client_secret.secret(),
            "code": code,
            "grant_type": "authorization_code",
            "redirect_uri": self.config.redirect_uri,
        });

        self.request_token(&body, None).await
    }

    /// Renova o access token a partir de um refresh token
    ///
    /// Se o provedor não rotacionar o refresh token, o atual é mantido.
    pub async fn refresh(&self, refresh_token: &str) -> OAuthResult<Credential> {
        tracing::info!("🔄 [OAuth2] Renovando access token via refresh token");

        let body = json!({
            "client_id": self.config.client_id.as_str(),
            "client_secret": self.config.client_secret.secret(),
            "refresh_token": refresh_token,
            "grant_type": "refresh_token",
        });

        self.request_token(&body, Some(refresh_token)).await
    }

    async fn request_token(&self, body: &Value, current_refresh: Option<&str>) -> OAuthResult<Credential> {
        let response = self
            .http_client
            .post(&self.config.token_url)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("❌ [OAuth2] Falha ao conectar com o endpoint de token: {}", e);
                OAuthError::from(e)
            })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = provider_message(&text);
            tracing::error!("❌ [OAuth2] Token endpoint retornou {}: {}", status, message);
            return Err(OAuthError::TokenEndpoint {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&text).map_err(|e| {
            tracing::error!("❌ [OAuth2] Resposta do token não é JSON válido: {}", e);
            OAuthError::MalformedResponse(e.to_string())
        })?;

        let access_token = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                tracing::error!("❌ [OAuth2] Resposta do token sem access_token");
                OAuthError::MissingAccessToken
            })?;

        let refresh_token = parsed
            .refresh_token
            .or_else(|| current_refresh.map(String::from));

        let credential = Credential::new(access_token, refresh_token);
        tracing::info!("✅ [OAuth2] Access token obtido: {}", credential.preview());

        Ok(credential)
    }
}

/// Extrai a mensagem de erro de um corpo de resposta do provedor
fn provider_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["err", "error_description", "error"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(token_url: &str) -> OAuthConfig {
        OAuthConfig::new("test_client_id", "test_client_secret", "http://127.0.0.1:8000/oauth/callback")
            .unwrap()
            .with_token_url(token_url)
    }

    #[test]
    fn test_authorization_url_contains_all_parameters() {
        let flow = OAuthFlow::new(test_config("http://localhost/token")).unwrap();
        let url = flow.authorization_url("nonce123");

        assert!(url.starts_with("https://app.clickup.com/api?"));
        assert!(url.contains("client_id=test_client_id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A8000%2Foauth%2Fcallback"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=task_write%2Ctask_read%2Cspace_read%2Cteam_read%2Clist_read"));
        assert!(url.contains("state=nonce123"));
    }

    #[tokio::test]
    async fn test_exchange_times_out_as_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "late_token" }))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let flow = OAuthFlow::with_timeout(
            test_config(&format!("{}/oauth/token", server.uri())),
            Duration::from_secs(1),
        )
        .unwrap();

        let started = std::time::Instant::now();
        let result = flow.exchange_code_for_token("valid_code_123").await;
        let elapsed = started.elapsed();

        assert!(matches!(result, Err(OAuthError::Transport(_))), "unexpected: {:?}", result);
        assert!(elapsed >= Duration::from_millis(900), "returned too early: {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(5), "timeout not applied: {:?}", elapsed);
    }

    #[test]
    fn test_authorization_url_is_deterministic() {
        let flow = OAuthFlow::new(test_config("http://localhost/token")).unwrap();
        assert_eq!(flow.authorization_url("abc"), flow.authorization_url("abc"));
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_partial_json(json!({
                "client_id": "test_client_id",
                "client_secret": "test_client_secret",
                "code": "auth_code_123",
                "grant_type": "authorization_code",
                "redirect_uri": "http://127.0.0.1:8000/oauth/callback"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "pk_access_token_value",
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let flow = OAuthFlow::new(test_config(&format!("{}/oauth/token", server.uri()))).unwrap();
        let credential = flow.exchange_code_for_token("auth_code_123").await.unwrap();

        assert_eq!(credential.access_token, "pk_access_token_value");
        assert_eq!(credential.refresh_token, None);
    }

    #[tokio::test]
    async fn test_exchange_code_without_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token_type": "Bearer" })))
            .mount(&server)
            .await;

        let flow = OAuthFlow::new(test_config(&format!("{}/oauth/token", server.uri()))).unwrap();
        let result = flow.exchange_code_for_token("code").await;

        assert_eq!(result.unwrap_err(), OAuthError::MissingAccessToken);
    }

    #[tokio::test]
    async fn test_exchange_code_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "err": "Code already used",
                "ECODE": "OAUTH_014"
            })))
            .mount(&server)
            .await;

        let flow = OAuthFlow::new(test_config(&format!("{}/oauth/token", server.uri()))).unwrap();
        let result = flow.exchange_code_for_token("code").await;

        assert_eq!(
            result.unwrap_err(),
            OAuthError::TokenEndpoint { status: 400, message: "Code already used".to_string() }
        );
    }

    #[tokio::test]
    async fn test_exchange_code_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let flow = OAuthFlow::new(test_config(&format!("{}/oauth/token", server.uri()))).unwrap();
        let result = flow.exchange_code_for_token("code").await;

        assert!(matches!(result, Err(OAuthError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_exchange_code_transport_failure() {
        // Porta sem servidor escutando
        let flow = OAuthFlow::with_timeout(
            test_config("http://127.0.0.1:9/oauth/token"),
            Duration::from_secs(2),
        )
        .unwrap();
        let result = flow.exchange_code_for_token("code").await;

        assert!(matches!(result, Err(OAuthError::Transport(_))));
    }

    #[tokio::test]
    async fn test_refresh_keeps_refresh_token_when_not_rotated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "grant_type": "refresh_token",
                "refresh_token": "refresh_1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "new_access_token"
            })))
            .mount(&server)
            .await;

        let flow = OAuthFlow::new(test_config(&format!("{}/oauth/token", server.uri()))).unwrap();
        let credential = flow.refresh("refresh_1").await.unwrap();

        assert_eq!(credential.access_token, "new_access_token");
        assert_eq!(credential.refresh_token.as_deref(), Some("refresh_1"));
    }

    #[test]
    fn test_provider_message_fallbacks() {
        assert_eq!(provider_message(r#"{"error":"invalid_grant"}"#), "invalid_grant");
        assert_eq!(provider_message("plain text failure"), "plain text failure");
        assert_eq!(provider_message(""), "empty response body");
    }
}
