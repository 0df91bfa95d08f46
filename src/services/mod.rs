pub mod commands;
pub mod openai;
pub mod prompts;

pub use commands::Command;
pub use openai::OpenAIService;
