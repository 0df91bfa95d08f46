use clap::{Parser, Subcommand};
use clickup_core::{ApiConfig, OAuthConfig, OAuthFlow, SessionManager};
use serde_json::{json, Map, Value};
use tracing_subscriber::EnvFilter;

/// CLI para a API v2 do ClickUp usando o token salvo pelo fluxo OAuth2
#[derive(Parser)]
#[command(name = "clickup")]
#[command(version)]
#[command(about = "CLI para integração com ClickUp API v2", long_about = None)]
struct Cli {
    /// Formato de saída (json, pretty)
    #[arg(short = 'o', long, default_value = "pretty", global = true)]
    output: OutputFormat,

    /// Modo verbose para debug
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Comando a executar
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, PartialEq)]
enum OutputFormat {
    Json,
    Pretty,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "pretty" => Ok(OutputFormat::Pretty),
            _ => Err(format!("Formato desconhecido: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Mostra se o token salvo ainda autentica
    Status,

    /// Remove o token salvo
    Logout,

    /// Renova o access token com o refresh token salvo
    Refresh,

    /// Lista os spaces do workspace
    Spaces,

    /// Lista as listas de um space
    Lists {
        space_id: String,
    },

    /// Lista as tasks de uma lista
    Tasks {
        list_id: String,
    },

    /// Obtém uma task
    Task {
        task_id: String,
    },

    /// Cria uma nova task
    CreateTask {
        /// ID da lista onde criar a task
        #[arg(short = 'l', long)]
        list_id: String,

        /// Nome/título da task
        #[arg(short = 'n', long)]
        name: String,

        /// Descrição da task
        #[arg(short = 'd', long, default_value = "")]
        description: String,

        /// Prioridade (1=Urgent, 2=High, 3=Normal, 4=Low)
        #[arg(short = 'p', long, value_parser = clap::value_parser!(u8).range(1..=4))]
        priority: Option<u8>,
    },
}

/// Estrutura para resposta padronizada
#[derive(serde::Serialize)]
struct CliResponse {
    success: bool,
    data: Option<Value>,
    error: Option<String>,
}

impl CliResponse {
    fn success(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(msg: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "error" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    let response = match execute_command(&cli.command).await {
        Ok(data) => CliResponse::success(data),
        Err(e) => CliResponse::error(e.to_string()),
    };

    let exit_code = if response.success { 0 } else { 1 };
    output_response(&response, &cli.output);
    std::process::exit(exit_code);
}

async fn execute_command(command: &Commands) -> anyhow::Result<Value> {
    let oauth = OAuthFlow::new(OAuthConfig::from_env()?)?;
    let session = SessionManager::new(oauth, ApiConfig::from_env()?);

    let authenticated =
        !matches!(command, Commands::Logout | Commands::Refresh) && session.restore().await;

    let data = match command {
        Commands::Logout => {
            session.logout().await?;
            json!({ "message": "Token removido" })
        }
        Commands::Refresh => serde_json::to_value(session.refresh().await?)?,
        Commands::Status => serde_json::to_value(session.status().await)?,
        _ if !authenticated => {
            anyhow::bail!("Sessão não autenticada. Autentique pelo servidor em /auth/clickup")
        }
        Commands::Spaces => session.run(|client| async move { client.list_spaces().await }).await?,
        Commands::Lists { space_id } => {
            session
                .run(|client| async move { client.list_lists(space_id).await })
                .await?
        }
        Commands::Tasks { list_id } => {
            session
                .run(|client| async move { client.list_tasks(list_id).await })
                .await?
        }
        Commands::Task { task_id } => {
            session
                .run(|client| async move { client.get_task(task_id).await })
                .await?
        }
        Commands::CreateTask { list_id, name, description, priority } => {
            let mut extra = Map::new();
            if let Some(priority) = priority {
                extra.insert("priority".to_string(), json!(priority));
            }
            session
                .run(|client| async move { client.create_task(list_id, name, description, extra).await })
                .await?
        }
    };

    Ok(data)
}

fn output_response(response: &CliResponse, format: &OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string(response) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("❌ Erro ao serializar resposta: {}", e),
        },
        OutputFormat::Pretty => {
            if let Some(data) = &response.data {
                println!("✅ Sucesso!");
                match serde_json::to_string_pretty(data) {
                    Ok(text) => println!("{}", text),
                    Err(_) => println!("{}", data),
                }
            } else if let Some(error) = &response.error {
                eprintln!("❌ Erro: {}", error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_refresh_command() {
        let cli = Cli::try_parse_from(["clickup", "refresh", "-o", "json"]).unwrap();
        assert!(matches!(cli.command, Commands::Refresh));
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn test_parse_create_task_priority_range() {
        let cli = Cli::try_parse_from(["clickup", "create-task", "-l", "901", "-n", "Update Documentation", "-p", "2"])
            .unwrap();
        match cli.command {
            Commands::CreateTask { list_id, priority, description, .. } => {
                assert_eq!(list_id, "901");
                assert_eq!(priority, Some(2));
                assert_eq!(description, "");
            }
            _ => panic!("expected create-task"),
        }

        assert!(Cli::try_parse_from(["clickup", "create-task", "-l", "901", "-n", "x", "-p", "5"]).is_err());
    }
}
