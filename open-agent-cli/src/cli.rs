use clap::{Parser, Subcommand};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3001;

#[derive(Parser, Debug)]
#[command(
    name = "open-agent",
    version,
    about = "Tool-calling assistant backed by MCP servers"
)]
pub struct Cli {
    /// Path to agent.toml (defaults to config/agent.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Override the system instruction from the config file
    #[arg(long, global = true)]
    pub system: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive chat on stdin/stdout
    Chat,
    /// REST API server
    Serve {
        #[arg(long)]
        addr: Option<SocketAddr>,
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },
    /// List every namespaced tool and exit
    Tools,
    /// Run a single turn and print the result as JSON
    Ask {
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
}

/// `--addr` wins; otherwise localhost on `--port`/`PORT`, falling back to 3001.
pub fn resolve_addr(addr: Option<SocketAddr>, port: Option<u16>) -> SocketAddr {
    addr.unwrap_or_else(|| {
        SocketAddr::from((Ipv4Addr::LOCALHOST, port.unwrap_or(DEFAULT_PORT)))
    })
}
