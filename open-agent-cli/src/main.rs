mod cli;

use clap::Parser;
use cli::{Cli, Command};
use open_agent_core::agent::{Agent, AgentError};
use open_agent_core::config::{AppConfig, ConfigError};
use open_agent_core::model::OpenAIClient;
use open_agent_core::server::{self, ServerError};
use open_agent_core::stdio::{self, StdioError};
use open_agent_core::tooling::{ConnectionManager, StdioConnector, ToolInvokeError, ToolRegistry};
use serde_json::json;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Tooling(#[from] ToolInvokeError),
    #[error("none of the {0} configured MCP servers could be started")]
    NoServerAvailable(usize),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error(transparent)]
    Stdio(#[from] StdioError),
    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();
    debug!(command = ?cli.command, config = ?cli.config, "CLI arguments parsed");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "open-agent failed");
            match &err {
                CliError::Agent(agent) => eprintln!("Error: {}", agent.user_message()),
                CliError::Server(server) => {
                    eprintln!("Error: {server} (check --addr or PORT for {})", server.addr())
                }
                other => eprintln!("Error: {other}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    info!(servers = config.servers.len(), "Loaded configuration");

    let manager = Arc::new(ConnectionManager::new(Arc::new(StdioConnector::default())));
    let summary = manager.connect_all(&config.servers).await?;
    for (server, err) in &summary.failed {
        warn!(server = %server, error = %err, "Continuing without server");
    }
    if summary.connected.is_empty() && summary.already_connected.is_empty() {
        return Err(CliError::NoServerAvailable(config.servers.len()));
    }

    let registry = Arc::new(ToolRegistry::new(Arc::clone(&manager)));
    let backend = Arc::new(OpenAIClient::from_config(&config.provider));
    let system_prompt = cli.system.clone().or(config.system_prompt.clone());
    let mut agent = Agent::new(backend, Arc::clone(&registry), config.agent.clone());
    if let Some(prompt) = system_prompt {
        agent = agent.with_system_prompt(prompt);
    }
    let agent = Arc::new(agent);

    let result = match cli.command {
        Command::Chat => {
            info!("Launching STDIO interactive chat");
            stdio::run(agent.as_ref()).await.map_err(CliError::from)
        }
        Command::Serve { addr, port } => {
            let addr = cli::resolve_addr(addr, port);
            info!(%addr, "Starting REST server");
            // serve disconnects on shutdown itself
            return server::serve(Arc::clone(&agent), addr)
                .await
                .map_err(CliError::from);
        }
        Command::Tools => print_tools(&registry).await,
        Command::Ask { prompt } => ask(&agent, &prompt.join(" ")).await,
    };

    manager.disconnect_all().await;
    info!("Client execution finished");
    result
}

async fn print_tools(registry: &ToolRegistry) -> Result<(), CliError> {
    let tools = registry.tools().await?;
    for tool in tools {
        println!("{}  ({})", tool.namespaced_name, tool.server);
        if !tool.description.is_empty() {
            println!("    {}", tool.description);
        }
    }
    println!("\n{} tools available.", tools.len());
    Ok(())
}

async fn ask(agent: &Agent<OpenAIClient>, prompt: &str) -> Result<(), CliError> {
    let outcome = agent.chat(prompt, None).await?;
    let output = json!({
        "response": outcome.response,
        "state": outcome.state,
        "history": outcome.conversation,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_level(true)
            .init();
    });
}
