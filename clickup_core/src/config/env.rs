use std::env;
use std::path::PathBuf;
use std::time::Duration;

use oauth2::{ClientId, ClientSecret};

use crate::error::ConfigError;

/// Endpoint de autorização (redirect do navegador)
pub const DEFAULT_AUTH_URL: &str = "https://app.clickup.com/api";
/// Endpoint de troca de código por token
pub const DEFAULT_TOKEN_URL: &str = "https://api.clickup.com/api/v2/oauth/token";
pub const DEFAULT_API_BASE_URL: &str = "https://api.clickup.com/api/v2";
/// Precisa ser idêntica à URI registrada no app do ClickUp
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8000/oauth/callback";
pub const DEFAULT_TOKEN_FILE: &str = "tokens.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SCOPES: [&str; 5] = ["task_write", "task_read", "space_read", "team_read", "list_read"];

/// Configuração do provedor OAuth2 (um único app ClickUp)
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    /// Cria a configuração validando as credenciais obrigatórias
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();
        let redirect_uri = redirect_uri.into();

        if client_id.trim().is_empty() {
            return Err(ConfigError::missing("CLICKUP_CLIENT_ID"));
        }
        if client_secret.trim().is_empty() {
            return Err(ConfigError::missing("CLICKUP_CLIENT_SECRET"));
        }
        if !redirect_uri.starts_with("http://") && !redirect_uri.starts_with("https://") {
            return Err(ConfigError::invalid(format!(
                "CLICKUP_REDIRECT_URI deve ser uma URL http(s): {}",
                redirect_uri
            )));
        }

        Ok(Self {
            client_id: ClientId::new(client_id),
            client_secret: ClientSecret::new(client_secret),
            redirect_uri,
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scopes: Vec<String> = scopes.into_iter().map(Into::into).collect();
        if scopes.is_empty() {
            return Err(ConfigError::invalid("pelo menos um scope OAuth2 é necessário"));
        }
        self.scopes = scopes;
        Ok(self)
    }

    /// Carrega do ambiente (e do `.env`, fora dos testes)
    ///
    /// `CLICKUP_SECRET` é aceito como nome alternativo de `CLICKUP_CLIENT_SECRET`.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();

        let client_id = env::var("CLICKUP_CLIENT_ID").unwrap_or_default();
        let client_secret = env::var("CLICKUP_CLIENT_SECRET")
            .or_else(|_| env::var("CLICKUP_SECRET"))
            .unwrap_or_default();
        let redirect_uri = env::var("CLICKUP_REDIRECT_URI")
            .unwrap_or_else(|_| DEFAULT_REDIRECT_URI.to_string());

        let mut config = Self::new(client_id, client_secret, redirect_uri)?;

        if let Ok(url) = env::var("CLICKUP_AUTH_URL") {
            config = config.with_auth_url(url);
        }
        if let Ok(url) = env::var("CLICKUP_TOKEN_URL") {
            config = config.with_token_url(url);
        }
        if let Ok(scopes) = env::var("CLICKUP_SCOPES") {
            config = config.with_scopes(parse_scopes(&scopes))?;
        }

        Ok(config)
    }
}

/// Configuração do cliente da API e do armazenamento de token
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_base_url: String,
    pub timeout: Duration,
    pub token_file: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();

        let mut config = Self::default();

        if let Ok(url) = env::var("CLICKUP_API_BASE_URL") {
            config.api_base_url = url;
        }
        if let Ok(path) = env::var("CLICKUP_TOKEN_FILE") {
            config.token_file = PathBuf::from(path);
        }
        if let Ok(secs) = env::var("CLICKUP_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| ConfigError::invalid(format!("CLICKUP_TIMEOUT_SECS inválido: {}", secs)))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

/// Lista de scopes separada por vírgula, ignorando itens vazios
pub fn parse_scopes(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|scope| !scope.is_empty())
        .map(String::from)
        .collect()
}

fn load_dotenv() {
    // Durante testes, as variáveis são configuradas diretamente
    if cfg!(not(test)) {
        dotenvy::dotenv().ok();
    }
}
