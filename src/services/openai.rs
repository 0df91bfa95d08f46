use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};

use crate::config::settings::OpenAISettings;
use crate::services::prompts::ASSISTANT_PROMPT;
use crate::utils::logging::*;
use crate::utils::{truncate_with_suffix, AppError, AppResult};

/// Cliente do endpoint chat-completions (compatível com OpenAI)
#[derive(Clone)]
pub struct OpenAIService {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for OpenAIService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIService")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAIService {
    /// Cria o serviço; `None` se `OPENAI_API_KEY` não estiver configurada
    pub fn new(settings: &OpenAISettings) -> Option<Self> {
        let api_key = match settings.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key.to_string(),
            _ => {
                log_warning("⚠️ OPENAI_API_KEY não configurada - /process responderá com erro de LLM");
                return None;
            }
        };

        let client = match Client::builder().timeout(Duration::from_secs(60)).build() {
            Ok(client) => client,
            Err(e) => {
                log_error(&format!("Failed to create OpenAI HTTP client: {}", e));
                return None;
            }
        };

        log_secret_loaded("OPENAI_API_KEY", &api_key);
        log_info("OpenAI service initialized successfully");

        Some(Self {
            client,
            api_key,
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Envia a mensagem do usuário com o prompt do assistente e retorna o
    /// conteúdo da primeira escolha
    pub async fn complete(&self, user_message: &str) -> AppResult<String> {
        let url = format!("{}/chat/completions", self.base_url);
        log_llm_request(&self.model, user_message.len());

        let request_body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": ASSISTANT_PROMPT},
                {"role": "user", "content": user_message}
            ]
        });

        let response = self.client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            log_error(&format!("OpenAI API error ({}): {}", status, error_text));
            return Err(AppError::LlmError(format!(
                "OpenAI API error ({}): {}",
                status.as_u16(),
                truncate_with_suffix(&error_text, 200, "...")
            )));
        }

        let json_response: Value = response.json().await?;

        let content = json_response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| AppError::LlmError("Invalid OpenAI response format".to_string()))?;

        log_info(&format!("🤖 Resposta do assistente: {}", truncate_with_suffix(content, 80, "...")));
        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: &str, api_key: Option<&str>) -> OpenAISettings {
        OpenAISettings {
            api_key: api_key.map(String::from),
            model: "gpt-4-turbo-preview".to_string(),
            base_url: base_url.to_string(),
        }
    }

    #[test]
    fn test_new_without_key() {
        assert!(OpenAIService::new(&settings("http://localhost", None)).is_none());
        assert!(OpenAIService::new(&settings("http://localhost", Some("  "))).is_none());
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test-key-123"))
            .and(body_partial_json(json!({
                "model": "gpt-4-turbo-preview",
                "messages": [
                    {"role": "system", "content": ASSISTANT_PROMPT},
                    {"role": "user", "content": "create task docs"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "Update Documentation\nDetails" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = OpenAIService::new(&settings(&server.uri(), Some("sk-test-key-123"))).unwrap();
        let reply = service.complete("create task docs").await.unwrap();
        assert_eq!(reply, "Update Documentation\nDetails");
    }

    #[tokio::test]
    async fn test_complete_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let service = OpenAIService::new(&settings(&server.uri(), Some("sk-bad"))).unwrap();
        let err = service.complete("hi").await.unwrap_err();
        assert!(matches!(err, AppError::LlmError(ref msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn test_complete_unexpected_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let service = OpenAIService::new(&settings(&server.uri(), Some("sk-test"))).unwrap();
        let err = service.complete("hi").await.unwrap_err();
        assert!(matches!(err, AppError::LlmError(_)));
    }
}
