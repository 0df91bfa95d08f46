use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use clickup_core::config::env::{
    parse_scopes, DEFAULT_API_BASE_URL, DEFAULT_AUTH_URL, DEFAULT_REDIRECT_URI, DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_FILE,
    DEFAULT_TOKEN_URL,
};
use clickup_core::{ApiConfig, OAuthConfig};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Variáveis de ambiente aceitas e a chave de configuração correspondente.
/// `CLICKUP_SECRET` vem antes para que `CLICKUP_CLIENT_SECRET` prevaleça.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("CLICKUP_CLIENT_ID", "clickup.client_id"),
    ("CLICKUP_SECRET", "clickup.client_secret"),
    ("CLICKUP_CLIENT_SECRET", "clickup.client_secret"),
    ("CLICKUP_REDIRECT_URI", "clickup.redirect_uri"),
    ("CLICKUP_API_BASE_URL", "clickup.api_base_url"),
    ("CLICKUP_AUTH_URL", "clickup.auth_url"),
    ("CLICKUP_TOKEN_URL", "clickup.token_url"),
    ("CLICKUP_SCOPES", "clickup.scopes"),
    ("CLICKUP_TOKEN_FILE", "clickup.token_file"),
    ("CLICKUP_TIMEOUT_SECS", "clickup.timeout_secs"),
    ("OPENAI_API_KEY", "openai.api_key"),
    ("OPENAI_MODEL", "openai.model"),
    ("OPENAI_BASE_URL", "openai.base_url"),
    ("PORT", "server.port"),
];

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub clickup: ClickUpSettings,
    pub openai: OpenAISettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClickUpSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub api_base_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub token_file: PathBuf,
    pub timeout_secs: u64,
    /// Scopes separados por vírgula; vazio usa os scopes padrão
    #[serde(default)]
    pub scopes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAISettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("clickup.client_id", "")?
            .set_default("clickup.client_secret", "")?
            .set_default("clickup.redirect_uri", DEFAULT_REDIRECT_URI)?
            .set_default("clickup.api_base_url", DEFAULT_API_BASE_URL)?
            .set_default("clickup.auth_url", DEFAULT_AUTH_URL)?
            .set_default("clickup.token_url", DEFAULT_TOKEN_URL)?
            .set_default("clickup.token_file", DEFAULT_TOKEN_FILE)?
            .set_default("clickup.timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("openai.model", DEFAULT_OPENAI_MODEL)?
            .set_default("openai.base_url", DEFAULT_OPENAI_BASE_URL)?
            // Arquivo de configuração base
            .add_source(File::with_name("config/default").required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false));

        // Variáveis de ambiente com os nomes usados pelo app do ClickUp
        for (var, key) in ENV_OVERRIDES {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(*key, value)?;
            }
        }

        // Prefixo genérico, ex: CLICKUP_AGENT__SERVER__HOST
        builder = builder.add_source(Environment::with_prefix("CLICKUP_AGENT").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// Configuração OAuth2 validada (client id e secret obrigatórios)
    pub fn oauth_config(&self) -> Result<OAuthConfig, clickup_core::ConfigError> {
        let clickup = &self.clickup;
        let config = OAuthConfig::new(&clickup.client_id, &clickup.client_secret, &clickup.redirect_uri)?
            .with_auth_url(&clickup.auth_url)
            .with_token_url(&clickup.token_url);

        match clickup.scopes.as_deref() {
            Some(scopes) => config.with_scopes(parse_scopes(scopes)),
            None => Ok(config),
        }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            api_base_url: self.clickup.api_base_url.clone(),
            timeout: Duration::from_secs(self.clickup.timeout_secs),
            token_file: self.clickup.token_file.clone(),
        }
    }
}
