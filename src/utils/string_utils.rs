/// Utilitários para manipulação segura de strings UTF-8

/// Trunca uma string sem cortar um caractere UTF-8 no meio
///
/// # Exemplo
/// ```
/// use clickup_agent::utils::string_utils::truncate_safe;
///
/// let text = "Olá, mundo! 🌍";
/// assert_eq!(truncate_safe(text, 3), "Ol");
/// ```
pub fn truncate_safe(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    &s[..end]
}

/// Trunca e adiciona um sufixo (como "...") quando houve corte
///
/// Espaços no fim do trecho cortado são removidos antes do sufixo.
pub fn truncate_with_suffix(s: &str, max_bytes: usize, suffix: &str) -> String {
    let truncated = truncate_safe(s, max_bytes);
    if truncated.len() < s.len() {
        format!("{}{}", truncated.trim_end(), suffix)
    } else {
        truncated.to_string()
    }
}

/// Separa a resposta do assistente em nome da task (primeira linha) e
/// descrição (restante, sem espaços nas pontas)
pub fn split_task_reply(reply: &str) -> (String, String) {
    match reply.split_once('\n') {
        Some((name, rest)) => (name.trim().to_string(), rest.trim().to_string()),
        None => (reply.trim().to_string(), String::new()),
    }
}
