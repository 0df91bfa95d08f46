use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, Method};
use serde_json::{Map, Value};
use tokio::sync::OnceCell;

use crate::auth::token::Credential;
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

/// Cliente autenticado da API v2 do ClickUp
///
/// Toda chamada leva `Authorization: Bearer <token>` e toda falha é
/// normalizada em [`ApiError`]. O workspace (team) é resolvido na primeira
/// chamada que precisa dele e mantido durante a vida do cliente.
#[derive(Debug)]
pub struct WorkspaceClient {
    http_client: Client,
    credential: Credential,
    base_url: String,
    workspace_id: OnceCell<String>,
}

impl WorkspaceClient {
    /// Cria um novo cliente a partir da configuração da API
    pub fn new(credential: Credential, config: &ApiConfig) -> ApiResult<Self> {
        Self::with_base_url(credential, &config.api_base_url, config.timeout)
    }

    pub fn with_base_url(credential: Credential, base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| ApiError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            credential,
            base_url: base_url.trim_end_matches('/').to_string(),
            workspace_id: OnceCell::new(),
        })
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Workspace já resolvido, sem fazer chamada
    pub fn cached_workspace_id(&self) -> Option<&str> {
        self.workspace_id.get().map(String::as_str)
    }

    /// Constrói URL completa para um endpoint
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Resolve o ID do primeiro workspace (team) autorizado
    ///
    /// Chamadas concorrentes compartilham uma única requisição `GET /team`.
    /// Também serve como verificação de que o token realmente autentica.
    pub async fn resolve_workspace_id(&self) -> ApiResult<String> {
        let id = self
            .workspace_id
            .get_or_try_init(|| self.fetch_first_workspace_id())
            .await?;
        Ok(id.clone())
    }

    async fn fetch_first_workspace_id(&self) -> ApiResult<String> {
        tracing::info!("👥 Obtendo equipes autorizadas...");
        let response = self.send(Method::GET, "team", None).await?;

        let teams = response
            .get("teams")
            .and_then(Value::as_array)
            .ok_or_else(|| ApiError::malformed(None, "campo 'teams' ausente ou não é um array"))?;

        let first = teams.first().ok_or_else(|| ApiError::NotFound {
            status: None,
            message: "no workspace: usuário não possui acesso a nenhuma equipe".to_string(),
        })?;

        // O ClickUp às vezes serializa o id como número
        let id = match first.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => return Err(ApiError::malformed(None, "ID da primeira equipe não encontrado")),
        };

        tracing::info!("📋 Workspace ID resolvido: {}", id);
        Ok(id)
    }

    /// GET /team/{team_id}/space
    pub async fn list_spaces(&self) -> ApiResult<Value> {
        let workspace_id = self.resolve_workspace_id().await?;
        tracing::info!("🏢 Obtendo spaces do team: {}", workspace_id);
        self.send(Method::GET, &format!("team/{}/space", workspace_id), None)
            .await
    }

    /// GET /space/{space_id}/list
    pub async fn list_lists(&self, space_id: &str) -> ApiResult<Value> {
        tracing::info!("📋 Obtendo listas do space: {}", space_id);
        self.send(Method::GET, &format!("space/{}/list", space_id), None)
            .await
    }

    /// GET /list/{list_id}/task
    pub async fn list_tasks(&self, list_id: &str) -> ApiResult<Value> {
        tracing::info!("📑 Obtendo tasks da lista: {}", list_id);
        self.send(Method::GET, &format!("list/{}/task", list_id), None)
            .await
    }

    /// Cria uma task na lista
    ///
    /// `extra_fields` é mesclado no corpo depois de `name` e `description`,
    /// então pode sobrescrevê-los.
    pub async fn create_task(
        &self,
        list_id: &str,
        name: &str,
        description: &str,
        extra_fields: Map<String, Value>,
    ) -> ApiResult<Value> {
        tracing::info!("📝 Criando nova task na lista: {}", list_id);

        let mut body = Map::new();
        body.insert("name".to_string(), Value::String(name.to_string()));
        body.insert("description".to_string(), Value::String(description.to_string()));
        body.extend(extra_fields);

        self.send(Method::POST, &format!("list/{}/task", list_id), Some(&Value::Object(body)))
            .await
    }

    /// PUT /task/{task_id}
    pub async fn update_task(&self, task_id: &str, fields: &Value) -> ApiResult<Value> {
        tracing::info!("📝 Atualizando task: {}", task_id);
        self.send(Method::PUT, &format!("task/{}", task_id), Some(fields))
            .await
    }

    /// GET /task/{task_id}
    pub async fn get_task(&self, task_id: &str) -> ApiResult<Value> {
        tracing::info!("📌 Obtendo task: {}", task_id);
        self.send(Method::GET, &format!("task/{}", task_id), None)
            .await
    }

    /// Executa uma requisição autenticada e normaliza a resposta
    async fn send(&self, method: Method, endpoint: &str, body: Option<&Value>) -> ApiResult<Value> {
        let url = self.build_url(endpoint);
        tracing::debug!("{} {} (token: {})", method, url, self.credential.preview());

        let mut request = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(&self.credential.access_token)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("❌ Falha na requisição {} {}: {}", method, url, e);
            ApiError::from(e)
        })?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        tracing::debug!("Response status: {}, {} bytes", status, text.len());

        let parsed = if text.trim().is_empty() {
            None
        } else {
            serde_json::from_str::<Value>(&text).ok()
        };
        let provider_err = parsed
            .as_ref()
            .and_then(|v| v.get("err"))
            .and_then(Value::as_str)
            .map(String::from);

        if !(200..300).contains(&status) {
            let message = provider_err.unwrap_or_else(|| default_message(status, &text));
            let error = ApiError::from_status(status, message);
            tracing::warn!("⚠️ {} {} falhou: {}", method, url, error);
            return Err(error);
        }

        if let Some(message) = provider_err {
            return Err(ApiError::Unknown { status: Some(status), message });
        }

        match parsed {
            Some(value) => Ok(value),
            None if text.trim().is_empty() => Ok(Value::Object(Map::new())),
            None => Err(ApiError::malformed(Some(status), "resposta não é JSON válido")),
        }
    }
}

/// Mensagem usada quando o corpo de erro não traz o campo `err`
fn default_message(status: u16, body: &str) -> String {
    let body = body.trim();
    if !body.is_empty() {
        return body.chars().take(200).collect();
    }
    match status {
        401 => "Token de acesso inválido ou expirado".to_string(),
        403 => "Acesso negado - verifique as permissões".to_string(),
        404 => "Recurso não encontrado".to_string(),
        429 => "Limite de requisições excedido".to_string(),
        _ => format!("Erro na API ({})", status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> WorkspaceClient {
        WorkspaceClient::with_base_url(
            Credential::new("pk_test_token_123", None),
            &server.uri(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    async fn mount_teams(server: &MockServer, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/team"))
            .and(header("authorization", "Bearer pk_test_token_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "teams": [{ "id": "9001", "name": "Acme" }, { "id": "9002", "name": "Other" }]
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[test]
    fn test_url_building() {
        let client = WorkspaceClient::with_base_url(
            Credential::new("token", None),
            "https://api.clickup.com/api/v2/",
            Duration::from_secs(30),
        )
        .unwrap();

        assert_eq!(client.build_url("team"), "https://api.clickup.com/api/v2/team");
        assert_eq!(client.build_url("/task/1"), "https://api.clickup.com/api/v2/task/1");
    }

    #[tokio::test]
    async fn test_workspace_id_resolved_once() {
        let server = MockServer::start().await;
        mount_teams(&server, 1).await;

        let client = client_for(&server);
        assert_eq!(client.cached_workspace_id(), None);

        let (a, b) = tokio::join!(client.resolve_workspace_id(), client.resolve_workspace_id());
        assert_eq!(a.unwrap(), "9001");
        assert_eq!(b.unwrap(), "9001");
        assert_eq!(client.resolve_workspace_id().await.unwrap(), "9001");
        assert_eq!(client.cached_workspace_id(), Some("9001"));
    }

    #[tokio::test]
    async fn test_empty_team_list_is_not_found_without_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/team"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "teams": [] })))
            .mount(&server)
            .await;

        let error = client_for(&server).resolve_workspace_id().await.unwrap_err();
        assert!(matches!(error, ApiError::NotFound { status: None, .. }));
    }

    #[tokio::test]
    async fn test_team_listing_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/team"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "err": "Token invalid",
                "ECODE": "OAUTH_025"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let error = client.resolve_workspace_id().await.unwrap_err();
        assert_eq!(
            error,
            ApiError::Unauthorized { status: Some(401), message: "Token invalid".to_string() }
        );
        // Falhas não ficam em cache
        assert_eq!(client.cached_workspace_id(), None);
    }

    #[tokio::test]
    async fn test_wrong_team_shape_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/team"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "workspaces": [] })))
            .mount(&server)
            .await;

        let error = client_for(&server).resolve_workspace_id().await.unwrap_err();
        assert!(matches!(error, ApiError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        for (task_id, status) in [("t401", 401), ("t403", 403), ("t404", 404), ("t429", 429), ("t500", 500)] {
            Mock::given(method("GET"))
                .and(path(format!("/task/{}", task_id)))
                .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "err": "failure" })))
                .mount(&server)
                .await;
        }

        let client = client_for(&server);
        let kinds = [
            ("t401", "unauthorized"),
            ("t403", "forbidden"),
            ("t404", "not_found"),
            ("t429", "rate_limited"),
            ("t500", "unknown"),
        ];
        for (task_id, kind) in kinds {
            let error = client.get_task(task_id).await.unwrap_err();
            assert_eq!(error.kind(), kind);
            assert_eq!(error.message(), "failure");
        }
    }

    #[tokio::test]
    async fn test_success_body_with_err_field_is_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/task/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "err": "Task not accessible" })))
            .mount(&server)
            .await;

        let error = client_for(&server).get_task("abc").await.unwrap_err();
        assert_eq!(
            error,
            ApiError::Unknown { status: Some(200), message: "Task not accessible".to_string() }
        );
    }

    #[tokio::test]
    async fn test_unparseable_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list/1/task"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let error = client_for(&server).list_tasks("1").await.unwrap_err();
        assert!(matches!(error, ApiError::MalformedResponse { status: Some(200), .. }));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let client = WorkspaceClient::with_base_url(
            Credential::new("token", None),
            "http://127.0.0.1:9",
            Duration::from_secs(2),
        )
        .unwrap();

        let error = client.get_task("1").await.unwrap_err();
        assert_eq!(error.kind(), "transport");
    }

    #[tokio::test]
    async fn test_hung_request_times_out_as_transport() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/team"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "teams": [{ "id": "9001" }] }))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let client = WorkspaceClient::with_base_url(
            Credential::new("pk_test_token_123", None),
            &server.uri(),
            Duration::from_secs(1),
        )
        .unwrap();

        let started = std::time::Instant::now();
        let error = client.resolve_workspace_id().await.unwrap_err();
        let elapsed = started.elapsed();

        assert_eq!(error.kind(), "transport");
        assert!(elapsed >= Duration::from_millis(900), "returned too early: {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(5), "timeout not applied: {:?}", elapsed);
        assert_eq!(client.cached_workspace_id(), None);
    }

    #[tokio::test]
    async fn test_list_spaces_uses_resolved_workspace() {
        let server = MockServer::start().await;
        mount_teams(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/team/9001/space"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "spaces": [{ "id": "s1", "name": "Engineering" }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let spaces = client.list_spaces().await.unwrap();
        assert_eq!(spaces["spaces"][0]["name"], "Engineering");

        client.list_spaces().await.unwrap();
    }

    #[tokio::test]
    async fn test_create_task_returns_echoed_task() {
        let server = MockServer::start().await;
        let description = "Revisar o README\nAtualizar exemplos da API\nPublicar changelog";
        Mock::given(method("POST"))
            .and(path("/list/901/task"))
            .and(body_json(json!({
                "name": "Update Documentation",
                "description": description,
                "priority": 2
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "86abc",
                "name": "Update Documentation",
                "description": description,
                "list": { "id": "901" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut extra = Map::new();
        extra.insert("priority".to_string(), json!(2));

        let task = client_for(&server)
            .create_task("901", "Update Documentation", description, extra)
            .await
            .unwrap();

        assert_eq!(task["name"], "Update Documentation");
        assert_eq!(task["list"]["id"], "901");
    }

    #[tokio::test]
    async fn test_update_task_sends_put() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/task/86abc"))
            .and(body_json(json!({ "status": "complete" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "86abc",
                "status": { "status": "complete" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let task = client_for(&server)
            .update_task("86abc", &json!({ "status": "complete" }))
            .await
            .unwrap();
        assert_eq!(task["status"]["status"], "complete");
    }
}
