pub mod api_error;
pub mod auth_error;

pub use api_error::{ApiError, ApiResult};
pub use auth_error::{ConfigError, OAuthError, OAuthResult, SessionError, SessionResult, StorageError};
