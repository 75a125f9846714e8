use crate::constants::INVALID_PARAMS_CODE;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolInvokeError {
    #[error("no tool servers configured")]
    NoServersConfigured,
    #[error("tool name '{name}' has no server namespace")]
    UnknownNamespace { name: String },
    #[error("MCP server '{server}' is not connected")]
    ServerNotConnected { server: String },
    #[error("failed to spawn MCP server '{server}': {source}")]
    Spawn {
        server: String,
        #[source]
        source: std::io::Error,
    },
    #[error("MCP server '{server}' transport error: {message}")]
    Transport { server: String, message: String },
    #[error("MCP server '{server}' returned invalid JSON: {source}")]
    InvalidJson {
        server: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("MCP server '{server}' terminated unexpectedly")]
    Terminated { server: String },
    #[error("MCP server '{server}' request cancelled")]
    Cancelled { server: String },
    #[error("MCP server '{server}' returned JSON-RPC error {code}: {message}")]
    Rpc {
        server: String,
        code: i64,
        message: String,
    },
    #[error("MCP server '{server}' sent a malformed response: {message}")]
    Protocol { server: String, message: String },
}

impl ToolInvokeError {
    /// True when the pipe to the server broke, as opposed to the server answering
    /// with an error. Only these failures trigger a reconnect.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            ToolInvokeError::Spawn { .. }
                | ToolInvokeError::Transport { .. }
                | ToolInvokeError::InvalidJson { .. }
                | ToolInvokeError::Terminated { .. }
                | ToolInvokeError::Cancelled { .. }
        )
    }

    /// True when the server rejected the call's arguments. Retrying reproduces the rejection.
    pub fn is_invalid_arguments(&self) -> bool {
        matches!(self, ToolInvokeError::Rpc { code, .. } if *code == INVALID_PARAMS_CODE)
    }

    pub fn server(&self) -> Option<&str> {
        match self {
            ToolInvokeError::NoServersConfigured | ToolInvokeError::UnknownNamespace { .. } => None,
            ToolInvokeError::ServerNotConnected { server }
            | ToolInvokeError::Spawn { server, .. }
            | ToolInvokeError::Transport { server, .. }
            | ToolInvokeError::InvalidJson { server, .. }
            | ToolInvokeError::Terminated { server }
            | ToolInvokeError::Cancelled { server }
            | ToolInvokeError::Rpc { server, .. }
            | ToolInvokeError::Protocol { server, .. } => Some(server),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ToolInvokeError::NoServersConfigured => {
                "No tool servers are configured. Add a [[servers]] entry to the config.".to_string()
            }
            ToolInvokeError::UnknownNamespace { name } => {
                format!("Tool \"{name}\" does not name a server; expected server__tool.")
            }
            ToolInvokeError::ServerNotConnected { server } => {
                format!("Tool server \"{server}\" is not connected.")
            }
            ToolInvokeError::Rpc { server, message, .. } => {
                format!("Tool server \"{server}\" rejected the call: {message}")
            }
            other => match other.server() {
                Some(server) => format!("Tool server \"{server}\" is unavailable: {other}"),
                None => other.to_string(),
            },
        }
    }
}
