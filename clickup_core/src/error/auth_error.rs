use thiserror::Error;

use super::ApiError;

/// Erros de configuração (fatais na inicialização)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Variável de ambiente obrigatória ausente: {0}")]
    MissingVar(String),

    #[error("Configuração inválida: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn missing(var: impl Into<String>) -> Self {
        Self::MissingVar(var.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Tipos de erro específicos do fluxo OAuth2
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OAuthError {
    #[error("Estado OAuth2 inválido ou expirado")]
    InvalidState,

    #[error("Acesso negado pelo usuário")]
    AccessDenied,

    #[error("Erro retornado pelo provedor OAuth2: {error}{}", describe(.description))]
    Provider { error: String, description: Option<String> },

    #[error("Código de autorização não encontrado no callback")]
    MissingCode,

    #[error("Falha de rede no endpoint de token: {0}")]
    Transport(String),

    #[error("Endpoint de token retornou status {status}: {message}")]
    TokenEndpoint { status: u16, message: String },

    #[error("Resposta do endpoint de token não é JSON válido: {0}")]
    MalformedResponse(String),

    #[error("Resposta do endpoint de token sem access_token")]
    MissingAccessToken,
}

fn describe(description: &Option<String>) -> String {
    description.as_deref().map(|d| format!(" ({})", d)).unwrap_or_default()
}

impl From<reqwest::Error> for OAuthError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Tipo de resultado padrão para operações OAuth2
pub type OAuthResult<T> = Result<T, OAuthError>;

/// Falhas de persistência do arquivo de token
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Erro de IO no armazenamento de token: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro de serialização do token: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Erros expostos pelo [`crate::SessionManager`]
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Sessão não autenticada. Execute o fluxo OAuth2 em /auth/clickup")]
    NotAuthenticated,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    OAuth(#[from] OAuthError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        assert_eq!(OAuthError::InvalidState.to_string(), "Estado OAuth2 inválido ou expirado");
        assert_eq!(OAuthError::AccessDenied.to_string(), "Acesso negado pelo usuário");
        assert_eq!(
            OAuthError::MissingAccessToken.to_string(),
            "Resposta do endpoint de token sem access_token"
        );
    }

    #[test]
    fn test_provider_error_with_description() {
        let error = OAuthError::Provider {
            error: "invalid_request".to_string(),
            description: Some("bad redirect".to_string()),
        };
        assert_eq!(error.to_string(), "Erro retornado pelo provedor OAuth2: invalid_request (bad redirect)");

        let error = OAuthError::Provider { error: "server_error".to_string(), description: None };
        assert_eq!(error.to_string(), "Erro retornado pelo provedor OAuth2: server_error");
    }

    #[test]
    fn test_config_error_constructors() {
        let error = ConfigError::missing("CLICKUP_CLIENT_ID");
        assert_eq!(error.to_string(), "Variável de ambiente obrigatória ausente: CLICKUP_CLIENT_ID");

        let error = ConfigError::invalid("redirect_uri deve ser uma URL");
        assert_eq!(error.to_string(), "Configuração inválida: redirect_uri deve ser uma URL");
    }

    #[test]
    fn test_session_error_is_transparent() {
        let error: SessionError = ApiError::from_status(403, "Team not authorized").into();
        assert!(error.to_string().contains("Team not authorized"));

        let error: SessionError = OAuthError::InvalidState.into();
        assert_eq!(error.to_string(), "Estado OAuth2 inválido ou expirado");
    }
}
