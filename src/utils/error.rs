use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt;

use clickup_core::{ApiError, OAuthError, SessionError};

#[derive(Debug)]
pub enum AppError {
    NotAuthenticated,
    ClickUpApi(ApiError),
    OAuth(OAuthError),
    LlmError(String),
    ConfigError(String),
    NotFound(String),
    ValidationError(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotAuthenticated => {
                write!(f, "not authenticated: complete o fluxo OAuth2 em /auth/clickup")
            }
            AppError::ClickUpApi(err) => write!(f, "{}", err),
            AppError::OAuth(err) => write!(f, "OAuth2 error: {}", err),
            AppError::LlmError(msg) => write!(f, "LLM error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AppError::ClickUpApi(err) => match err {
                ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
                ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
                ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
                ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                ApiError::Transport { .. } | ApiError::MalformedResponse { .. } | ApiError::Unknown { .. } => {
                    StatusCode::BAD_GATEWAY
                }
            },
            AppError::OAuth(err) => match err {
                OAuthError::InvalidState
                | OAuthError::AccessDenied
                | OAuthError::Provider { .. }
                | OAuthError::MissingCode => StatusCode::BAD_REQUEST,
                OAuthError::Transport(_)
                | OAuthError::TokenEndpoint { .. }
                | OAuthError::MalformedResponse(_)
                | OAuthError::MissingAccessToken => StatusCode::BAD_GATEWAY,
            },
            AppError::LlmError(_) => StatusCode::BAD_GATEWAY,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotAuthenticated => AppError::NotAuthenticated,
            SessionError::Api(e) => AppError::ClickUpApi(e),
            SessionError::OAuth(e) => AppError::OAuth(e),
            SessionError::Config(e) => AppError::ConfigError(e.to_string()),
            SessionError::Storage(e) => AppError::InternalError(e.to_string()),
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        AppError::ClickUpApi(err)
    }
}

impl From<OAuthError> for AppError {
    fn from(err: OAuthError) -> Self {
        AppError::OAuth(err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::LlmError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = json!({
            "error": self.to_string(),
            "status": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
