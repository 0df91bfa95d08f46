pub mod clickup;
pub mod health;
pub mod process;

pub use clickup::*;
pub use health::*;
pub use process::*;

// Handlers OAuth2 ficam em src/auth/handlers.rs
