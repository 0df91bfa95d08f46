use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use serde::Serialize;

/// Frases que disparam criação de task (têm prioridade)
const CREATE_TASK_PHRASES: [&str; 3] = ["create task", "new task", "add task"];
const LIST_SPACES_PHRASES: [&str; 1] = ["list spaces"];

/// Comando interpretado a partir da mensagem do usuário
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    CreateTask,
    ListSpaces,
    Chat,
}

static MATCHER: Lazy<Option<AhoCorasick>> = Lazy::new(|| {
    let patterns = CREATE_TASK_PHRASES.iter().chain(LIST_SPACES_PHRASES.iter());
    match AhoCorasick::builder().ascii_case_insensitive(true).build(patterns) {
        Ok(matcher) => Some(matcher),
        Err(e) => {
            tracing::error!("❌ Falha ao construir matcher de comandos: {}", e);
            None
        }
    }
});

impl Command {
    /// Detecta o comando por palavras-chave, sem diferenciar maiúsculas
    pub fn detect(message: &str) -> Self {
        let Some(matcher) = MATCHER.as_ref() else {
            return Command::Chat;
        };

        let mut detected = Command::Chat;
        for found in matcher.find_iter(message) {
            if found.pattern().as_usize() < CREATE_TASK_PHRASES.len() {
                return Command::CreateTask;
            }
            detected = Command::ListSpaces;
        }
        detected
    }

    /// Se o comando precisa de uma sessão autenticada no ClickUp
    pub fn requires_clickup(&self) -> bool {
        !matches!(self, Command::Chat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_create_task_variants() {
        assert_eq!(Command::detect("Please create task for the docs"), Command::CreateTask);
        assert_eq!(Command::detect("NEW TASK: fix login"), Command::CreateTask);
        assert_eq!(Command::detect("can you add task to review PR"), Command::CreateTask);
    }

    #[test]
    fn test_detect_list_spaces() {
        assert_eq!(Command::detect("List Spaces please"), Command::ListSpaces);
    }

    #[test]
    fn test_create_task_takes_priority() {
        assert_eq!(
            Command::detect("list spaces and then create task for onboarding"),
            Command::CreateTask
        );
    }

    #[test]
    fn test_everything_else_is_chat() {
        assert_eq!(Command::detect("what is a sprint?"), Command::Chat);
        assert_eq!(Command::detect(""), Command::Chat);
        assert!(!Command::Chat.requires_clickup());
        assert!(Command::ListSpaces.requires_clickup());
    }
}
