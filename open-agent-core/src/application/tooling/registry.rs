use super::connection::ToolOutput;
use super::error::ToolInvokeError;
use super::manager::ConnectionManager;
use crate::domain::types::NamespacedTool;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Facade the agent uses to see and call tools.
///
/// The catalog is discovered on first use and kept for the lifetime of the
/// registry; reconnecting a server does not refresh it.
pub struct ToolRegistry {
    manager: Arc<ConnectionManager>,
    catalog: OnceCell<Vec<NamespacedTool>>,
}

impl ToolRegistry {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self {
            manager,
            catalog: OnceCell::new(),
        }
    }

    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    pub async fn tools(&self) -> Result<&[NamespacedTool], ToolInvokeError> {
        let catalog = self
            .catalog
            .get_or_try_init(|| async {
                let tools = self.manager.list_tools().await?;
                info!(count = tools.len(), "Discovered tool catalog");
                Ok::<_, ToolInvokeError>(tools)
            })
            .await?;
        Ok(catalog.as_slice())
    }

    pub async fn invoke(
        &self,
        namespaced_name: &str,
        arguments: Value,
    ) -> Result<ToolOutput, ToolInvokeError> {
        debug!(tool = namespaced_name, "Dispatching tool via MCP");
        self.manager.call_tool(namespaced_name, arguments).await
    }
}
