pub mod callback;
pub mod oauth;
pub mod token;

pub use callback::{validate_callback, CallbackParams, StateStore};
pub use oauth::OAuthFlow;
pub use token::{mask_secret, Credential, TokenStore};
