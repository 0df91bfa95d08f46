pub mod api;

pub use api::WorkspaceClient;
