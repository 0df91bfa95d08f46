use thiserror::Error;

/// Taxonomia normalizada de falhas da API de workspace do ClickUp
///
/// Toda falha de [`crate::WorkspaceClient`] chega ao chamador neste formato,
/// com o status HTTP original (quando houve resposta) e uma mensagem legível.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("ClickUp API unauthorized{}: {message}", status_label(.status))]
    Unauthorized { status: Option<u16>, message: String },

    #[error("ClickUp API forbidden{}: {message}", status_label(.status))]
    Forbidden { status: Option<u16>, message: String },

    #[error("ClickUp API resource not found{}: {message}", status_label(.status))]
    NotFound { status: Option<u16>, message: String },

    #[error("ClickUp API rate limit exceeded{}: {message}", status_label(.status))]
    RateLimited { status: Option<u16>, message: String },

    #[error("ClickUp API transport failure: {message}")]
    Transport { message: String },

    #[error("ClickUp API malformed response{}: {message}", status_label(.status))]
    MalformedResponse { status: Option<u16>, message: String },

    #[error("ClickUp API error{}: {message}", status_label(.status))]
    Unknown { status: Option<u16>, message: String },
}

impl ApiError {
    /// Mapeia um status HTTP não-2xx para o tipo de erro correspondente
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        let status = Some(status);
        match status {
            Some(401) => Self::Unauthorized { status, message },
            Some(403) => Self::Forbidden { status, message },
            Some(404) => Self::NotFound { status, message },
            Some(429) => Self::RateLimited { status, message },
            _ => Self::Unknown { status, message },
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    pub fn malformed(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::MalformedResponse { status, message: message.into() }
    }

    /// Status HTTP original, se a falha veio de uma resposta
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. }
            | Self::Forbidden { status, .. }
            | Self::NotFound { status, .. }
            | Self::RateLimited { status, .. }
            | Self::MalformedResponse { status, .. }
            | Self::Unknown { status, .. } => *status,
            Self::Transport { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized { message, .. }
            | Self::Forbidden { message, .. }
            | Self::NotFound { message, .. }
            | Self::RateLimited { message, .. }
            | Self::Transport { message }
            | Self::MalformedResponse { message, .. }
            | Self::Unknown { message, .. } => message,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Nome estável do tipo, usado nos corpos de erro JSON
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::Forbidden { .. } => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::RateLimited { .. } => "rate_limited",
            Self::Transport { .. } => "transport",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::Unknown { .. } => "unknown",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::transport(format!("request timed out: {}", err))
        } else if err.is_connect() {
            Self::transport(format!("connection failed: {}", err))
        } else if err.is_decode() {
            Self::malformed(err.status().map(|s| s.as_u16()), err.to_string())
        } else {
            Self::transport(err.to_string())
        }
    }
}

fn status_label(status: &Option<u16>) -> String {
    status.map(|code| format!(" (status {})", code)).unwrap_or_default()
}

/// Tipo de resultado padrão para chamadas à API de workspace
pub type ApiResult<T> = Result<T, ApiError>;
