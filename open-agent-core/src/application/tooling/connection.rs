use super::error::ToolInvokeError;
use crate::config::ServerConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerToolInfo {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

/// Result of a tool call, resolved once at the protocol boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// One entry per content block; blocks without text are rendered as JSON.
    TextBlocks(Vec<String>),
    RawValue(Value),
}

impl ToolOutput {
    /// Interpret a `tools/call` result payload.
    pub fn from_call_result(result: Value) -> Self {
        match result.get("content").and_then(Value::as_array) {
            Some(blocks) => ToolOutput::TextBlocks(
                blocks
                    .iter()
                    .map(|block| match block.get("text").and_then(Value::as_str) {
                        Some(text) => text.to_string(),
                        None => block.to_string(),
                    })
                    .collect(),
            ),
            None => ToolOutput::RawValue(result),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            ToolOutput::TextBlocks(blocks) => blocks.join("\n"),
            ToolOutput::RawValue(value) => value.to_string(),
        }
    }
}

/// A live, fully initialised connection to one tool server.
#[async_trait]
pub trait ToolServerConnection: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ServerToolInfo>, ToolInvokeError>;

    async fn call_tool(&self, tool: &str, arguments: Value)
    -> Result<ToolOutput, ToolInvokeError>;

    async fn close(&self) -> Result<(), ToolInvokeError>;
}

/// Establishes connections from launch configuration.
#[async_trait]
pub trait ServerConnector: Send + Sync {
    async fn connect(
        &self,
        config: &ServerConfig,
    ) -> Result<Arc<dyn ToolServerConnection>, ToolInvokeError>;
}
